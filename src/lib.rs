//! Card game client framework.
//!
//! This crate exposes the client's managers (asset cache, UI host, audio,
//! tables, levels, persistence), its panels and the ECS systems that tie
//! them together, for use by the binary and integration tests.

pub mod bundler;
pub mod components;
pub mod events;
pub mod game;
pub mod panels;
pub mod resources;
pub mod systems;
