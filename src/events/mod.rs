//! Event types and observers used by the client.
//!
//! Submodules:
//! - [`audio`] – commands and messages for the background audio thread
//! - [`gamecommand`] – requests from panels and tools, applied by the command router
//! - [`gamestate`] – state transition notifications for the high-level game flow
//! - [`panel`] – button presses addressed to a panel
pub mod audio;
pub mod gamecommand;
pub mod gamestate;
pub mod panel;
