//! Player progress persistence.
//!
//! A single [`PlayerRecord`] is kept in memory and persisted as one pretty
//! JSON document at `<save_dir>/PlayerData/playerdata.json`. Saving overwrites
//! the file in place; there is no atomic replace or backup, so a crash during
//! the write can leave a truncated file. Loading such a file falls back to a
//! fresh record.

use bevy_ecs::prelude::Resource;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

const SAVE_FOLDER: &str = "PlayerData";
const SAVE_FILE: &str = "playerdata.json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file not found: {0}")]
    Missing(String),

    #[error("failed to access '{path}': {details}")]
    Io { path: String, details: String },

    #[error("malformed save '{path}': {details}")]
    Malformed { path: String, details: String },
}

/// Fields missing from a save file take their [`Default`] value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRecord {
    pub player_id: String,
    pub player_name: String,
    pub level: u32,
    pub current_level: u32,
    pub gold: i64,
    pub diamond: i64,
    pub last_save_time: i64,
}

/// Starting values with an empty id.
impl Default for PlayerRecord {
    fn default() -> Self {
        PlayerRecord {
            player_id: String::new(),
            player_name: "Player".to_string(),
            level: 1,
            current_level: 1,
            gold: 0,
            diamond: 0,
            last_save_time: 0,
        }
    }
}

impl PlayerRecord {
    /// Fresh record with a generated id and starting values.
    pub fn fresh() -> Self {
        PlayerRecord {
            player_id: generate_player_id(),
            ..Default::default()
        }
    }
}

/// Random identifier formatted as a version-4 UUID.
pub fn generate_player_id() -> String {
    let hi = fastrand::u64(..);
    let lo = fastrand::u64(..);
    let hi = (hi & 0xffff_ffff_ffff_0fff) | 0x0000_0000_0000_4000;
    let lo = (lo & 0x3fff_ffff_ffff_ffff) | 0x8000_0000_0000_0000;
    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        hi >> 32,
        (hi >> 16) & 0xffff,
        hi & 0xffff,
        lo >> 48,
        lo & 0xffff_ffff_ffff
    )
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[derive(Resource, Debug)]
pub struct DataStore {
    save_dir: PathBuf,
    player: Option<PlayerRecord>,
}

impl DataStore {
    /// Prepare `<save_dir>/PlayerData`. A directory that cannot be created is
    /// logged; saves will then fail and be logged too.
    pub fn new(save_dir: impl AsRef<Path>) -> Self {
        let save_dir = save_dir.as_ref().join(SAVE_FOLDER);
        if let Err(e) = std::fs::create_dir_all(&save_dir) {
            error!(
                "[DataStore] Cannot create save directory {}: {}",
                save_dir.display(),
                e
            );
        }
        info!("[DataStore] Initialized at: {}", save_dir.display());
        DataStore {
            save_dir,
            player: None,
        }
    }

    pub fn save_path(&self) -> PathBuf {
        self.save_dir.join(SAVE_FILE)
    }

    pub fn player(&self) -> Option<&PlayerRecord> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerRecord> {
        self.player.as_mut()
    }

    /// Read the save file. Missing or malformed files yield a fresh, saved record.
    pub fn load_player(&mut self) {
        match self.read_record() {
            Ok(mut record) => {
                let missing_id = record.player_id.is_empty();
                if missing_id {
                    warn!("[DataStore] Save has no player id, generating one");
                    record.player_id = generate_player_id();
                }
                self.player = Some(record);
                info!("[DataStore] Player data loaded successfully");
                if missing_id {
                    self.save_player();
                }
            }
            Err(SaveError::Missing(_)) => self.create_new_player(),
            Err(e) => {
                error!("[DataStore] Error loading player data: {}", e);
                self.create_new_player();
            }
        }
    }

    /// Stamp and write the current record. Does nothing without a record.
    pub fn save_player(&mut self) {
        let path = self.save_path();
        let Some(player) = self.player.as_mut() else {
            return;
        };
        player.last_save_time = unix_now();
        match write_record(&path, player) {
            Ok(()) => info!("[DataStore] Player data saved successfully"),
            Err(e) => error!("[DataStore] Error saving player data: {}", e),
        }
    }

    /// Delete the save file and start over with a fresh record.
    pub fn reset_player(&mut self) {
        let path = self.save_path();
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                error!("[DataStore] Cannot delete {}: {}", path.display(), e);
            }
        }
        self.create_new_player();
        info!("[DataStore] Player data reset");
    }

    /// Record a completed level: advance progress if it was the current
    /// level, add the gold reward, and save.
    pub fn complete_level(&mut self, level_id: u32, gold: i64) {
        let Some(player) = self.player.as_mut() else {
            error!("[DataStore] No player data to update");
            return;
        };
        if player.current_level == level_id {
            player.current_level = level_id.saturating_add(1);
        }
        player.gold = player.gold.saturating_add(gold);
        info!(
            "[DataStore] Level {} completed: current level {}, gold {}",
            level_id, player.current_level, player.gold
        );
        self.save_player();
    }

    fn create_new_player(&mut self) {
        self.player = Some(PlayerRecord::fresh());
        self.save_player();
        info!("[DataStore] New player data created");
    }

    fn read_record(&self) -> Result<PlayerRecord, SaveError> {
        let path = self.save_path();
        if !path.exists() {
            return Err(SaveError::Missing(path.display().to_string()));
        }
        let text = std::fs::read_to_string(&path).map_err(|e| SaveError::Io {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| SaveError::Malformed {
            path: path.display().to_string(),
            details: e.to_string(),
        })
    }
}

fn write_record(path: &Path, record: &PlayerRecord) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(record).map_err(|e| SaveError::Malformed {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|e| SaveError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}
