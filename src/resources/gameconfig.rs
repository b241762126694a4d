//! Game configuration resource.
//!
//! Settings are read from an INI file. Every value has a default, and keys
//! missing from the file keep it.
//!
//! # Configuration File Format
//!
//! ```ini
//! [paths]
//! asset_root = ./assets
//! save_dir = ./save
//! bundle_source = ./bundle_src
//!
//! [window]
//! width = 1280
//! height = 720
//! target_fps = 60
//!
//! [audio]
//! music_volume = 0.5
//! sfx_volume = 0.5
//! main_music = audio_bgm/main
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

const DEFAULT_ASSET_ROOT: &str = "./assets";
const DEFAULT_SAVE_DIR: &str = "./save";
const DEFAULT_BUNDLE_SOURCE: &str = "./bundle_src";
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_VOLUME: f32 = 0.5;
const DEFAULT_MAIN_MUSIC: &str = "audio_bgm/main";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Root of the bundled asset tree the runtime loads from.
    pub asset_root: PathBuf,
    /// Directory holding `PlayerData/`.
    pub save_dir: PathBuf,
    /// Source tree scanned by the bundling tool.
    pub bundle_source: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    /// Address of the track started once the title screen is up.
    pub main_music: String,
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            bundle_source: PathBuf::from(DEFAULT_BUNDLE_SOURCE),
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            music_volume: DEFAULT_VOLUME,
            sfx_volume: DEFAULT_VOLUME,
            main_music: DEFAULT_MAIN_MUSIC.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. Volumes are clamped to
    /// `[0, 1]`. Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [paths] section
        if let Some(root) = config.get("paths", "asset_root") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(dir) = config.get("paths", "save_dir") {
            self.save_dir = PathBuf::from(dir);
        }
        if let Some(src) = config.get("paths", "bundle_source") {
            self.bundle_source = PathBuf::from(src);
        }

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }

        // [audio] section
        if let Some(vol) = config.getfloat("audio", "music_volume").ok().flatten() {
            self.music_volume = (vol as f32).clamp(0.0, 1.0);
        }
        if let Some(vol) = config.getfloat("audio", "sfx_volume").ok().flatten() {
            self.sfx_volume = (vol as f32).clamp(0.0, 1.0);
        }
        if let Some(music) = config.get("audio", "main_music") {
            self.main_music = music;
        }

        info!(
            "Loaded config: assets={:?} save={:?} {}x{} fps={} music={} sfx={}",
            self.asset_root,
            self.save_dir,
            self.window_width,
            self.window_height,
            self.target_fps,
            self.music_volume,
            self.sfx_volume
        );

        Ok(())
    }

    /// Save configuration to the INI file, creating it if needed.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        let path_str = |p: &PathBuf| Some(p.to_string_lossy().into_owned());
        config.set("paths", "asset_root", path_str(&self.asset_root));
        config.set("paths", "save_dir", path_str(&self.save_dir));
        config.set("paths", "bundle_source", path_str(&self.bundle_source));

        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        config.set("audio", "music_volume", Some(self.music_volume.to_string()));
        config.set("audio", "sfx_volume", Some(self.sfx_volume.to_string()));
        config.set("audio", "main_music", Some(self.main_music.clone()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}
