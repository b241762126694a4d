//! Client systems.
//!
//! This module groups the ECS systems run once per frame by the game
//! schedule.
//!
//! Submodules overview
//! - [`assets`] – apply finished asynchronous asset loads
//! - [`audio`] – audio device trait, audio thread and the message bridge
//! - [`commands`] – route game commands to the managers
//! - [`gamestate`] – check for pending state transitions and trigger events
//! - `render` – draw panels with raylib (`raylib` feature)
//! - [`time`] – update simulation time and delta
//! - [`ui`] – deliver panel input and advance panel updates
pub mod assets;
pub mod audio;
pub mod commands;
pub mod gamestate;
#[cfg(feature = "raylib")]
pub mod render;
pub mod time;
pub mod ui;
