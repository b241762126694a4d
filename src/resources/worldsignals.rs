//! World-wide flags and strings.
//!
//! Used for cross-system signals that have no better home, such as the
//! [`QUIT_FLAG`] checked by the main loop or the current scene name.

use bevy_ecs::prelude::Resource;
use rustc_hash::{FxHashMap, FxHashSet};

/// Set when the game has saved and wants the main loop to exit.
pub const QUIT_FLAG: &str = "quit_game";
/// Name of the panel flow currently on screen.
pub const SCENE_KEY: &str = "scene";

#[derive(Debug, Clone, Default, Resource)]
pub struct WorldSignals {
    /// Presence-only boolean flags; a key being present means "true".
    pub flags: FxHashSet<String>,
    pub strings: FxHashMap<String, String>,
}

impl WorldSignals {
    pub fn set_flag(&mut self, key: impl Into<String>) {
        self.flags.insert(key.into());
    }

    pub fn clear_flag(&mut self, key: &str) {
        self.flags.remove(key);
    }

    pub fn has_flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }
}
