//! Reward screen shown after a won battle.

use super::{
    CARD_BUILD_PANEL, Initializable, PanelArgs, PanelBehavior, PanelContext, PanelView, Showable,
    VICTORY_PANEL,
};
use crate::components::tween::{Easing, Fade};
use crate::events::gamecommand::GameCommand;
use crate::resources::uihost::UiLayer;
use log::info;

pub const REWARD_FADE: f32 = 0.5;
pub const REWARD_GROUP: &str = "reward";

pub fn gold_reward(level: u32) -> i64 {
    100 * level as i64
}

pub fn exp_reward(level: u32) -> i64 {
    50 * level as i64
}

#[derive(Debug, Default)]
pub struct VictoryPanel {
    level: u32,
    reward_fade: Option<Fade>,
}

impl VictoryPanel {
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Initializable for VictoryPanel {
    fn initialize(&mut self, _view: &mut PanelView, _ctx: &PanelContext) {
        info!("[VictoryPanel] Initialized");
    }
}

impl Showable for VictoryPanel {
    fn on_show(&mut self, args: &PanelArgs, view: &mut PanelView, ctx: &mut PanelContext) {
        let Some(level) = args.level() else {
            return;
        };
        self.level = level;
        let gold = gold_reward(level);
        let exp = exp_reward(level);
        view.set_text("title", "VICTORY!");
        view.set_text(REWARD_GROUP, format!("Gold: +{}\nExp: +{}", gold, exp));
        view.set_group_alpha(REWARD_GROUP, 0.0);
        self.reward_fade = Some(Fade::fade_in(REWARD_FADE).with_easing(Easing::QuadOut));
        ctx.emit(GameCommand::CompleteLevel {
            level_id: level,
            gold,
        });
        info!("[VictoryPanel] Victory rewards shown for level: {}", level);
    }
}

impl PanelBehavior for VictoryPanel {
    fn on_button(&mut self, id: &str, _view: &mut PanelView, ctx: &mut PanelContext) {
        if id == "continue" {
            info!("[VictoryPanel] Continue button clicked");
            ctx.emit(GameCommand::close(VICTORY_PANEL));
            ctx.emit(GameCommand::show(CARD_BUILD_PANEL, UiLayer::Normal));
        }
    }

    fn update(&mut self, dt: f32, view: &mut PanelView, _ctx: &mut PanelContext) {
        if let Some(fade) = self.reward_fade.as_mut() {
            view.set_group_alpha(REWARD_GROUP, fade.advance(dt));
            if fade.finished() {
                self.reward_fade = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::testing;

    fn view() -> PanelView {
        testing::view(VICTORY_PANEL, &["title", "reward"], &["continue"])
    }

    #[test]
    fn rewards_scale_with_level() {
        assert_eq!(gold_reward(3), 300);
        assert_eq!(exp_reward(3), 150);
    }

    #[test]
    fn show_completes_level_and_fades_rewards_in() {
        let mut panel = VictoryPanel::default();
        let mut view = view();
        let mut ctx = PanelContext::new(None);
        panel.on_show(&PanelArgs::Level(2), &mut view, &mut ctx);
        assert_eq!(view.text("reward"), Some("Gold: +200\nExp: +100"));
        assert_eq!(view.group_alpha(REWARD_GROUP), 0.0);
        assert_eq!(
            ctx.into_commands(),
            vec![GameCommand::CompleteLevel {
                level_id: 2,
                gold: 200
            }]
        );

        let mut ctx = PanelContext::new(None);
        panel.update(0.25, &mut view, &mut ctx);
        assert!((view.group_alpha(REWARD_GROUP) - 0.75).abs() < 1e-6);
        panel.update(0.5, &mut view, &mut ctx);
        assert_eq!(view.group_alpha(REWARD_GROUP), 1.0);
    }

    #[test]
    fn show_without_level_emits_nothing() {
        let mut panel = VictoryPanel::default();
        let mut view = view();
        let mut ctx = PanelContext::new(None);
        panel.on_show(&PanelArgs::None, &mut view, &mut ctx);
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn continue_closes_and_returns_to_card_build() {
        let mut panel = VictoryPanel::default();
        let mut view = view();
        let mut ctx = PanelContext::new(None);
        panel.on_button("continue", &mut view, &mut ctx);
        assert_eq!(
            ctx.into_commands(),
            vec![
                GameCommand::close(VICTORY_PANEL),
                GameCommand::show(CARD_BUILD_PANEL, UiLayer::Normal)
            ]
        );
    }
}
