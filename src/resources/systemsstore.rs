//! Registry for named one-shot systems.
//!
//! State hooks (`"load_game"`, `"quit_game"`) are registered here at boot and
//! run later via their [`SystemId`] from the game state observer or from
//! [`Game`](crate::game::Game) directly.

use bevy_ecs::prelude::Resource;
use bevy_ecs::system::SystemId;
use rustc_hash::FxHashMap;

pub const LOAD_GAME: &str = "load_game";
pub const QUIT_GAME: &str = "quit_game";

#[derive(Resource, Default)]
pub struct SystemsStore {
    pub map: FxHashMap<String, SystemId>,
}

impl SystemsStore {
    pub fn new() -> Self {
        SystemsStore::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: SystemId) {
        self.map.insert(name.into(), id);
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&SystemId> {
        self.map.get(name.as_ref())
    }
}
