//! Level definitions resolved from the `Levels` table.
//!
//! Definitions are built lazily on first request and cached for the lifetime
//! of the registry; they are never mutated after creation.
//!
//! ```json
//! [ { "id": 1, "name": "Forest Gate", "difficulty": 1, "targetScore": 100,
//!     "enemies": [ { "unitId": 2, "level": 1, "star": 0 } ] } ]
//! ```

use crate::components::unit::Unit;
use crate::resources::assetcache::AssetCache;
use crate::resources::tablereader::{TableReader, field_i64, field_str};
use bevy_ecs::prelude::Resource;
use log::{error, info};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub const LEVELS_TABLE: &str = "Levels";

/// Reference to one enemy unit of a level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyRef {
    pub unit_id: u32,
    #[serde(default = "one")]
    pub level: u32,
    #[serde(default)]
    pub star: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelDef {
    pub id: u32,
    pub name: String,
    pub difficulty: i32,
    pub target_score: i32,
    pub enemies: Vec<EnemyRef>,
}

impl LevelDef {
    /// Parse a `Levels` record. `None` if a required field is missing.
    pub fn from_record(record: &Value) -> Option<Self> {
        let enemies = match record.get("enemies") {
            Some(v) => match serde_json::from_value::<Vec<EnemyRef>>(v.clone()) {
                Ok(list) => list,
                Err(e) => {
                    error!("[LevelRegistry] Bad enemy list: {}", e);
                    return None;
                }
            },
            None => Vec::new(),
        };
        Some(LevelDef {
            id: u32::try_from(field_i64(record, "id")?).ok()?,
            name: field_str(record, "name")?.to_string(),
            difficulty: field_i64(record, "difficulty")? as i32,
            target_score: field_i64(record, "targetScore")? as i32,
            enemies,
        })
    }

    /// Instantiate this level's enemy units from the `Units` table.
    pub fn instantiate_enemies(&self, tables: &mut TableReader, cache: &mut AssetCache) -> Vec<Unit> {
        self.enemies
            .iter()
            .map(|e| Unit::from_table(tables, cache, e.unit_id, e.level, e.star))
            .collect()
    }
}

#[derive(Resource, Default)]
pub struct LevelRegistry {
    levels: FxHashMap<u32, Arc<LevelDef>>,
    current: Option<Arc<LevelDef>>,
}

impl LevelRegistry {
    pub fn new() -> Self {
        info!("[LevelRegistry] Initialized");
        LevelRegistry::default()
    }

    /// Resolve a level, building it from the table on first request.
    pub fn get_level(
        &mut self,
        tables: &mut TableReader,
        cache: &mut AssetCache,
        level_id: u32,
    ) -> Option<Arc<LevelDef>> {
        if let Some(level) = self.levels.get(&level_id) {
            return Some(level.clone());
        }
        let Some(record) = tables.record(cache, LEVELS_TABLE, &level_id.to_string()) else {
            error!("[LevelRegistry] Level not found: {}", level_id);
            return None;
        };
        let Some(level) = LevelDef::from_record(record) else {
            error!("[LevelRegistry] Level record {} is malformed", level_id);
            return None;
        };
        info!("[LevelRegistry] Level {} loaded: {}", level_id, level.name);
        let level = Arc::new(level);
        self.levels.insert(level_id, level.clone());
        Some(level)
    }

    /// Resolve a level and make it current.
    pub fn load_level(
        &mut self,
        tables: &mut TableReader,
        cache: &mut AssetCache,
        level_id: u32,
    ) -> Option<Arc<LevelDef>> {
        if self.levels.contains_key(&level_id) {
            info!("[LevelRegistry] Level {} loaded from cache", level_id);
        }
        let level = self.get_level(tables, cache, level_id)?;
        self.current = Some(level.clone());
        Some(level)
    }

    pub fn start_level(
        &mut self,
        tables: &mut TableReader,
        cache: &mut AssetCache,
        level_id: u32,
    ) -> Option<Arc<LevelDef>> {
        let level = self.load_level(tables, cache, level_id)?;
        info!("[LevelRegistry] Starting level: {}", level.name);
        Some(level)
    }

    pub fn current(&self) -> Option<&Arc<LevelDef>> {
        self.current.as_ref()
    }

    pub fn is_cached(&self, level_id: u32) -> bool {
        self.levels.contains_key(&level_id)
    }
}
