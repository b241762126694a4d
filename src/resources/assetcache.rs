//! Address-keyed asset cache.
//!
//! The cache sits in front of an [`AssetLoader`] and guarantees at most one
//! cached instance per [`Address`]. Lookups are cache-aside: a hit returns the
//! cached `Arc` untouched, a miss issues exactly one loader request.
//!
//! Two loading paths are offered:
//! - [`AssetCache::load`] blocks on the loader and returns the asset.
//! - [`AssetCache::load_async`] runs the loader on a worker thread and returns
//!   a [`LoadHandle`]. Results are only applied to the cache, and delivered to
//!   handles, by [`AssetCache::pump`] on the owning thread (the
//!   [`pump_asset_loads`](crate::systems::assets::pump_asset_loads) system
//!   calls it once per frame).
//!
//! Concurrent misses on the same address are not coalesced: each one runs
//! its own loader request. The first result to be pumped wins the cache slot;
//! later duplicates are released back to the loader and their callers receive
//! the cached instance.

use crate::resources::address::Address;
use crate::resources::assetloader::{Asset, AssetKind, AssetLoader};
use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded, unbounded};
use log::{debug, error, info, warn};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Result of polling a [`LoadHandle`].
#[derive(Debug, Clone)]
pub enum LoadStatus {
    /// The load is still in flight.
    Pending,
    Ready(Arc<Asset>),
    Failed,
    /// The caller cancelled the handle; no result will be delivered.
    Cancelled,
}

impl LoadStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadStatus::Pending)
    }

    pub fn asset(&self) -> Option<&Arc<Asset>> {
        match self {
            LoadStatus::Ready(a) => Some(a),
            _ => None,
        }
    }
}

/// Caller side of an asynchronous load.
///
/// The result is delivered exactly once: `Some(asset)` on success, `None` on
/// failure. Once received it is kept by the handle, so polling again returns
/// the same status.
#[derive(Debug)]
pub struct LoadHandle {
    address: Address,
    rx: Receiver<Option<Arc<Asset>>>,
    cancelled: Arc<AtomicBool>,
    received: Option<Option<Arc<Asset>>>,
}

impl LoadHandle {
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// A handle whose cache was dropped before the load landed reports
    /// `Failed`.
    pub fn poll(&mut self) -> LoadStatus {
        if self.received.is_none() {
            if self.is_cancelled() {
                return LoadStatus::Cancelled;
            }
            match self.rx.try_recv() {
                Ok(result) => self.received = Some(result),
                Err(TryRecvError::Empty) => return LoadStatus::Pending,
                Err(TryRecvError::Disconnected) => self.received = Some(None),
            }
        }
        match &self.received {
            Some(Some(asset)) => LoadStatus::Ready(asset.clone()),
            Some(None) => LoadStatus::Failed,
            None => LoadStatus::Pending,
        }
    }

    /// Stop delivery of the result. The asset is still cached if the load succeeds.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

struct Completed {
    request: u64,
    address: Address,
    kind: AssetKind,
    result: Result<Asset, crate::resources::assetloader::AssetError>,
}

struct PendingLoad {
    reply: Sender<Option<Arc<Asset>>>,
    cancelled: Arc<AtomicBool>,
}

/// Address-keyed cache of loaded assets.
#[derive(Resource)]
pub struct AssetCache {
    loader: Arc<dyn AssetLoader>,
    entries: FxHashMap<Address, Arc<Asset>>,
    tx_done: Sender<Completed>,
    rx_done: Receiver<Completed>,
    pending: FxHashMap<u64, PendingLoad>,
    next_request: u64,
    loads_issued: u64,
}

impl AssetCache {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        let (tx_done, rx_done) = unbounded();
        info!("[AssetCache] Initialized");
        AssetCache {
            loader,
            entries: FxHashMap::default(),
            tx_done,
            rx_done,
            pending: FxHashMap::default(),
            next_request: 0,
            loads_issued: 0,
        }
    }

    /// Blocking load. Never panics; failures are logged and yield `None`.
    pub fn load(&mut self, address: &Address, kind: AssetKind) -> Option<Arc<Asset>> {
        if let Some(hit) = self.entries.get(address) {
            return Self::checked_kind(address, hit, kind);
        }

        self.loads_issued += 1;
        match self.loader.load(address, kind) {
            Ok(asset) => {
                let asset = self.insert_loaded(address, asset);
                info!("[AssetCache] Loaded resource: {}", address);
                Self::checked_kind(address, &asset, kind)
            }
            Err(e) => {
                error!("[AssetCache] Failed to load resource {}: {}", address, e);
                None
            }
        }
    }

    /// Non-blocking load. A cache hit yields an already fulfilled handle.
    pub fn load_async(&mut self, address: &Address, kind: AssetKind) -> LoadHandle {
        let (reply, rx) = bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = LoadHandle {
            address: address.clone(),
            rx,
            cancelled: cancelled.clone(),
            received: None,
        };

        if let Some(hit) = self.entries.get(address) {
            let _ = reply.send(Self::checked_kind(address, hit, kind));
            return handle;
        }

        let request = self.next_request;
        self.next_request += 1;
        self.loads_issued += 1;
        self.pending.insert(request, PendingLoad { reply, cancelled });

        let loader = self.loader.clone();
        let tx_done = self.tx_done.clone();
        let address = address.clone();
        debug!("[AssetCache] async load #{} '{}' started", request, address);
        std::thread::spawn(move || {
            let result = loader.load(&address, kind);
            let _ = tx_done.send(Completed {
                request,
                address,
                kind,
                result,
            });
        });

        handle
    }

    /// Apply finished asynchronous loads. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let done: Vec<Completed> = self.rx_done.try_iter().collect();
        let count = done.len();
        for completed in done {
            self.complete(completed);
        }
        count
    }

    /// Block until every in-flight load has been applied or `timeout` elapses.
    /// Returns `true` when nothing is left pending.
    pub fn finish_pending(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx_done.recv_timeout(remaining) {
                Ok(completed) => self.complete(completed),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.pending.is_empty()
    }

    /// Evict one entry and release it. Unloading an absent address is a no-op.
    pub fn unload(&mut self, address: &Address) -> bool {
        match self.entries.remove(address) {
            Some(_) => {
                self.loader.release(address);
                info!("[AssetCache] Unloaded resource: {}", address);
                true
            }
            None => false,
        }
    }

    /// Release every cached entry. In-flight loads still land afterwards.
    pub fn clear(&mut self) {
        for address in self.entries.keys() {
            self.loader.release(address);
        }
        self.entries.clear();
        info!("[AssetCache] Cache cleared");
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.entries.contains_key(address)
    }

    pub fn get(&self, address: &Address) -> Option<&Arc<Asset>> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Total loader requests issued since creation.
    pub fn loads_issued(&self) -> u64 {
        self.loads_issued
    }

    /// Load a text asset and return its contents.
    pub fn text(&mut self, address: &Address) -> Option<String> {
        self.load(address, AssetKind::Text)
            .and_then(|a| a.as_text().map(str::to_string))
    }

    fn complete(&mut self, completed: Completed) {
        let Some(pending) = self.pending.remove(&completed.request) else {
            return;
        };
        let delivered = match completed.result {
            Ok(asset) => {
                info!("[AssetCache] Loaded resource: {}", completed.address);
                let asset = self.insert_loaded(&completed.address, asset);
                Self::checked_kind(&completed.address, &asset, completed.kind)
            }
            Err(e) => {
                error!(
                    "[AssetCache] Failed to load resource {}: {}",
                    completed.address, e
                );
                None
            }
        };
        if pending.cancelled.load(Ordering::Acquire) {
            debug!(
                "[AssetCache] async load #{} '{}' cancelled, result not delivered",
                completed.request, completed.address
            );
            return;
        }
        let _ = pending.reply.send(delivered);
    }

    fn insert_loaded(&mut self, address: &Address, asset: Asset) -> Arc<Asset> {
        if let Some(existing) = self.entries.get(address) {
            warn!(
                "[AssetCache] Duplicate load of {} discarded, keeping cached instance",
                address
            );
            self.loader.release(address);
            return existing.clone();
        }
        let asset = Arc::new(asset);
        self.entries.insert(address.clone(), asset.clone());
        asset
    }

    fn checked_kind(address: &Address, asset: &Arc<Asset>, kind: AssetKind) -> Option<Arc<Asset>> {
        if asset.kind() == kind {
            Some(asset.clone())
        } else {
            warn!(
                "[AssetCache] {} is cached as {:?}, not {:?}",
                address,
                asset.kind(),
                kind
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::assetloader::AssetError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingLoader {
        loads: Mutex<Vec<String>>,
        releases: Mutex<Vec<String>>,
    }

    impl AssetLoader for CountingLoader {
        fn load(&self, address: &Address, _kind: AssetKind) -> Result<Asset, AssetError> {
            self.loads.lock().unwrap().push(address.to_string());
            if address.name().starts_with("missing") {
                return Err(AssetError::NotFound(address.clone()));
            }
            Ok(Asset::Text(address.to_string()))
        }

        fn release(&self, address: &Address) {
            self.releases.lock().unwrap().push(address.to_string());
        }
    }

    fn cache() -> (Arc<CountingLoader>, AssetCache) {
        let loader = Arc::new(CountingLoader::default());
        let cache = AssetCache::new(loader.clone());
        (loader, cache)
    }

    #[test]
    fn second_load_is_cache_hit() {
        let (loader, mut cache) = cache();
        let a = "tables/Units".into();
        let first = cache.load(&a, AssetKind::Text).unwrap();
        let second = cache.load(&a, AssetKind::Text).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.loads.lock().unwrap().len(), 1);
    }

    #[test]
    fn unload_then_load_is_fresh() {
        let (loader, mut cache) = cache();
        let a = "tables/Units".into();
        let first = cache.load(&a, AssetKind::Text).unwrap();
        assert!(cache.unload(&a));
        assert!(!cache.unload(&a));
        let second = cache.load(&a, AssetKind::Text).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(loader.loads.lock().unwrap().len(), 2);
        assert_eq!(loader.releases.lock().unwrap().len(), 1);
    }

    #[test]
    fn failure_is_none_and_not_cached() {
        let (_loader, mut cache) = cache();
        let a = "tables/missing".into();
        assert!(cache.load(&a, AssetKind::Text).is_none());
        assert!(!cache.contains(&a));
    }

    #[test]
    fn wrong_kind_on_hit_is_none() {
        let (_loader, mut cache) = cache();
        let a = "tables/Units".into();
        cache.load(&a, AssetKind::Text).unwrap();
        assert!(cache.load(&a, AssetKind::Prefab).is_none());
        assert!(cache.contains(&a));
    }

    #[test]
    fn async_load_delivers_after_pump() {
        let (_loader, mut cache) = cache();
        let a: Address = "tables/Levels".into();
        let mut handle = cache.load_async(&a, AssetKind::Text);
        assert!(cache.finish_pending(Duration::from_secs(5)));
        let status = handle.poll();
        assert!(status.asset().is_some());
        assert!(Arc::ptr_eq(status.asset().unwrap(), cache.get(&a).unwrap()));
        // Polling again returns the same result.
        assert!(handle.poll().asset().is_some());
    }

    #[test]
    fn async_hit_is_ready_immediately() {
        let (loader, mut cache) = cache();
        let a: Address = "tables/Levels".into();
        cache.load(&a, AssetKind::Text).unwrap();
        let mut handle = cache.load_async(&a, AssetKind::Text);
        assert!(handle.poll().asset().is_some());
        assert_eq!(loader.loads.lock().unwrap().len(), 1);
        assert_eq!(cache.pending_count(), 0);
    }

    #[test]
    fn async_failure_delivers_failed() {
        let (_loader, mut cache) = cache();
        let mut handle = cache.load_async(&"tables/missing_x".into(), AssetKind::Text);
        assert!(cache.finish_pending(Duration::from_secs(5)));
        assert!(matches!(handle.poll(), LoadStatus::Failed));
    }

    #[test]
    fn cancelled_handle_gets_nothing_but_asset_is_cached() {
        let (_loader, mut cache) = cache();
        let a: Address = "tables/Levels".into();
        let mut handle = cache.load_async(&a, AssetKind::Text);
        handle.cancel();
        assert!(cache.finish_pending(Duration::from_secs(5)));
        assert!(matches!(handle.poll(), LoadStatus::Cancelled));
        assert!(cache.contains(&a));
    }

    #[test]
    fn concurrent_misses_issue_two_loads_but_cache_one_instance() {
        let (loader, mut cache) = cache();
        let a: Address = "tables/Levels".into();
        let mut h1 = cache.load_async(&a, AssetKind::Text);
        let mut h2 = cache.load_async(&a, AssetKind::Text);
        assert!(cache.finish_pending(Duration::from_secs(5)));
        assert_eq!(loader.loads.lock().unwrap().len(), 2);
        assert_eq!(loader.releases.lock().unwrap().len(), 1);
        let s1 = h1.poll();
        let s2 = h2.poll();
        assert!(Arc::ptr_eq(s1.asset().unwrap(), s2.asset().unwrap()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn async_delivery_checks_kind_of_cached_duplicate() {
        let (_loader, mut cache) = cache();
        let a: Address = "audio_sfx/click".into();
        let mut handle = cache.load_async(&a, AssetKind::Audio);
        // A blocking load lands first and caches the address as text.
        cache.load(&a, AssetKind::Text).unwrap();
        assert!(cache.finish_pending(Duration::from_secs(5)));
        assert!(matches!(handle.poll(), LoadStatus::Failed));
        assert!(cache.load(&a, AssetKind::Audio).is_none());
    }

    #[test]
    fn handle_fails_when_cache_is_dropped() {
        let (_loader, mut cache) = cache();
        let mut handle = cache.load_async(&"tables/Levels".into(), AssetKind::Text);
        drop(cache);
        assert!(matches!(handle.poll(), LoadStatus::Failed));
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn clear_releases_everything() {
        let (loader, mut cache) = cache();
        cache.load(&"tables/A".into(), AssetKind::Text);
        cache.load(&"tables/B".into(), AssetKind::Text);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(loader.releases.lock().unwrap().len(), 2);
    }
}
