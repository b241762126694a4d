//! Title screen.

use super::{CARD_BUILD_PANEL, Initializable, MAIN_PANEL, PanelBehavior, PanelContext, PanelView, Showable};
use crate::events::gamecommand::GameCommand;
use crate::resources::uihost::UiLayer;
use log::info;

#[derive(Debug, Default)]
pub struct MainPanel;

impl Initializable for MainPanel {
    fn initialize(&mut self, _view: &mut PanelView, _ctx: &PanelContext) {
        info!("[MainPanel] Initialized");
    }
}

impl Showable for MainPanel {}

impl PanelBehavior for MainPanel {
    fn on_button(&mut self, id: &str, _view: &mut PanelView, ctx: &mut PanelContext) {
        match id {
            "start" => {
                info!("[MainPanel] Start button clicked");
                ctx.emit(GameCommand::hide(MAIN_PANEL));
                ctx.emit(GameCommand::show(CARD_BUILD_PANEL, UiLayer::Normal));
            }
            "settings" => {
                // No settings screen yet.
                info!("[MainPanel] Settings button clicked");
            }
            "quit" => {
                info!("[MainPanel] Quit button clicked");
                ctx.emit(GameCommand::Quit);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::testing;

    fn press(id: &str) -> Vec<GameCommand> {
        let mut panel = MainPanel;
        let mut view = testing::view(MAIN_PANEL, &[], &["start", "settings", "quit"]);
        let mut ctx = PanelContext::new(None);
        panel.on_button(id, &mut view, &mut ctx);
        ctx.into_commands()
    }

    #[test]
    fn start_swaps_to_card_build() {
        assert_eq!(
            press("start"),
            vec![
                GameCommand::hide(MAIN_PANEL),
                GameCommand::show(CARD_BUILD_PANEL, UiLayer::Normal)
            ]
        );
    }

    #[test]
    fn settings_only_logs() {
        assert!(press("settings").is_empty());
    }

    #[test]
    fn quit_requests_quit() {
        assert_eq!(press("quit"), vec![GameCommand::Quit]);
    }
}
