//! ECS resources made available to systems.
//!
//! This module groups the long-lived managers injected into the ECS world:
//! asset loading and caching, data tables, the UI host, audio, persistence
//! and the high-level game state.
//!
//! Overview
//! - `address` – asset addresses and their fixed groups
//! - `assetcache` – reference-counted cache with sync and async loads
//! - `assetloader` – loader trait, loaded asset variants and the filesystem loader
//! - `audio` – audio player state and the bridge to the audio thread
//! - `battle` – running battle session and its enemy units
//! - `datastore` – player record persisted as JSON
//! - `gameconfig` – settings read from an INI file
//! - `gamestate` – authoritative and pending high-level game state
//! - `levelregistry` – level definitions resolved from the levels table
//! - `prefab` – panel layout description loaded from JSON
//! - `systemsstore` – registry of dynamically-lookup-able systems by name
//! - `tablereader` – JSON data tables keyed by name
//! - `uihost` – layered panel host and panel lifecycle
//! - `worldsignals` – flags and strings shared across systems
//! - `worldtime` – simulation time and delta
pub mod address;
pub mod assetcache;
pub mod assetloader;
pub mod audio;
pub mod battle;
pub mod datastore;
pub mod gameconfig;
pub mod gamestate;
pub mod levelregistry;
pub mod prefab;
pub mod systemsstore;
pub mod tablereader;
pub mod uihost;
pub mod worldsignals;
pub mod worldtime;
