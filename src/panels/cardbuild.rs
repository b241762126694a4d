//! Deck screen. Shows the player's current level and leads into a battle.

use super::{
    BATTLE_PANEL, CARD_BUILD_PANEL, Initializable, MAIN_PANEL, PanelArgs, PanelBehavior, PanelContext,
    PanelView, Showable,
};
use crate::events::gamecommand::GameCommand;
use crate::resources::uihost::UiLayer;
use log::info;

#[derive(Debug)]
pub struct CardBuildPanel {
    current_level: u32,
}

impl Default for CardBuildPanel {
    fn default() -> Self {
        CardBuildPanel { current_level: 1 }
    }
}

impl CardBuildPanel {
    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    fn refresh(&mut self, view: &mut PanelView, ctx: &PanelContext) {
        if let Some(player) = ctx.player() {
            self.current_level = player.current_level;
        }
        view.set_text("level", format!("Level: {}", self.current_level));
        view.set_text(
            "cards",
            "Select your cards...\n(Card selection UI will be added later)",
        );
    }
}

impl Initializable for CardBuildPanel {
    fn initialize(&mut self, view: &mut PanelView, ctx: &PanelContext) {
        self.refresh(view, ctx);
        info!("[CardBuildPanel] Initialized");
    }
}

impl Showable for CardBuildPanel {
    // Re-read on every show: a victory may have advanced the level while
    // this panel was hidden.
    fn on_show(&mut self, _args: &PanelArgs, view: &mut PanelView, ctx: &mut PanelContext) {
        self.refresh(view, ctx);
    }
}

impl PanelBehavior for CardBuildPanel {
    fn on_button(&mut self, id: &str, _view: &mut PanelView, ctx: &mut PanelContext) {
        match id {
            "start_battle" => {
                info!("[CardBuildPanel] Start Battle button clicked");
                ctx.emit(GameCommand::hide(CARD_BUILD_PANEL));
                ctx.emit(GameCommand::ShowPanel {
                    address: BATTLE_PANEL.into(),
                    layer: UiLayer::Normal,
                    args: PanelArgs::Level(self.current_level),
                });
                ctx.emit(GameCommand::StartBattle {
                    level_id: self.current_level,
                });
            }
            "back" => {
                info!("[CardBuildPanel] Back button clicked");
                ctx.emit(GameCommand::hide(CARD_BUILD_PANEL));
                ctx.emit(GameCommand::show(MAIN_PANEL, UiLayer::Normal));
            }
            _ => {}
        }
    }
}
