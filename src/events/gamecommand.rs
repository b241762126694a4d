//! Commands emitted by panel behaviours.
//!
//! Panels never reach into the managers directly. Their handlers emit
//! [`GameCommand`]s, which the
//! [`apply_game_commands`](crate::systems::commands::apply_game_commands)
//! system executes against the cache, UI host, data store, audio player and
//! battle session in emission order.

use crate::panels::PanelArgs;
use crate::resources::address::Address;
use crate::resources::uihost::UiLayer;
use bevy_ecs::message::Message;

#[derive(Message, Debug, Clone, PartialEq)]
pub enum GameCommand {
    ShowPanel {
        address: Address,
        layer: UiLayer,
        args: PanelArgs,
    },
    /// Show with an alpha fade-in of `duration` seconds.
    ShowPanelAnimated {
        address: Address,
        layer: UiLayer,
        args: PanelArgs,
        duration: f32,
    },
    HidePanel(Address),
    /// Fade out over `duration` seconds, then hide.
    HidePanelAnimated { address: Address, duration: f32 },
    ClosePanel(Address),
    CloseAllPanels,
    StartBattle { level_id: u32 },
    EndBattle { victory: bool },
    PauseBattle,
    ResumeBattle,
    CompleteLevel { level_id: u32, gold: i64 },
    PlayMusic(Address),
    StopMusic,
    PlaySfx(Address),
    SaveGame,
    ReloadScene,
    Quit,
}

impl GameCommand {
    pub fn show(address: impl Into<Address>, layer: UiLayer) -> Self {
        GameCommand::ShowPanel {
            address: address.into(),
            layer,
            args: PanelArgs::None,
        }
    }

    pub fn hide(address: impl Into<Address>) -> Self {
        GameCommand::HidePanel(address.into())
    }

    pub fn close(address: impl Into<Address>) -> Self {
        GameCommand::ClosePanel(address.into())
    }
}
