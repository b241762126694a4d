//! Per-frame application of asynchronous asset loads.

use crate::resources::assetcache::AssetCache;
use bevy_ecs::prelude::*;
use log::debug;

/// Move finished worker loads into the cache and fulfil their handles.
pub fn pump_asset_loads(mut cache: ResMut<AssetCache>) {
    let applied = cache.pump();
    if applied > 0 {
        debug!("[AssetCache] {} async loads applied", applied);
    }
}
