//! High-level game state.
//!
//! [`GameState`] holds the authoritative state. A transition is requested by
//! writing [`NextGameState`]; the
//! [`check_pending_state`](crate::systems::gamestate::check_pending_state)
//! system notices the request and triggers the observer in
//! [`crate::events::gamestate`], which applies it and runs the enter hook.

use bevy_ecs::prelude::Resource;

/// Discrete high-level states of the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameStates {
    #[default]
    None,
    /// Managers are up; the player record is loaded and the title shown.
    Setup,
    Playing,
    /// Progress is saved and the main loop is asked to exit.
    Quitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NextGameStates {
    #[default]
    Unchanged,
    Pending(GameStates),
}

#[derive(Resource, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GameState {
    current: GameStates,
}

impl GameState {
    pub fn new() -> Self {
        GameState::default()
    }

    pub fn get(&self) -> &GameStates {
        &self.current
    }

    /// Update the current state immediately, skipping enter hooks.
    pub fn set(&mut self, state: GameStates) {
        self.current = state;
    }
}

/// Intent to change to a new game state.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NextGameState {
    next: NextGameStates,
}

impl NextGameState {
    pub fn new() -> Self {
        NextGameState::default()
    }

    pub fn get(&self) -> &NextGameStates {
        &self.next
    }

    /// Request a transition. A later request before the observer runs wins.
    pub fn set(&mut self, next: GameStates) {
        self.next = NextGameStates::Pending(next);
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.next, NextGameStates::Pending(_))
    }

    pub fn reset(&mut self) {
        self.next = NextGameStates::Unchanged;
    }
}
