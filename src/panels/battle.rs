//! Battle screen.
//!
//! Real combat is not implemented. The panel runs a fixed-length timer while
//! the battle session holds the spawned enemy units, then reports a victory.

use super::{
    BATTLE_PANEL, Initializable, PanelArgs, PanelBehavior, PanelContext, PanelView, Showable,
    VICTORY_PANEL,
};
use crate::components::timer::Timer;
use crate::events::gamecommand::GameCommand;
use crate::resources::uihost::UiLayer;
use log::info;

pub const BATTLE_DURATION: f32 = 3.0;

#[derive(Debug)]
pub struct BattlePanel {
    level: u32,
    timer: Timer,
    paused: bool,
    running: bool,
}

impl Default for BattlePanel {
    fn default() -> Self {
        BattlePanel {
            level: 0,
            timer: Timer::new(BATTLE_DURATION),
            paused: false,
            running: false,
        }
    }
}

impl BattlePanel {
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn progress(&self) -> f32 {
        self.timer.progress()
    }

    fn victory(&mut self, ctx: &mut PanelContext) {
        info!("[BattlePanel] Battle Victory!");
        self.running = false;
        ctx.emit(GameCommand::EndBattle { victory: true });
        ctx.emit(GameCommand::hide(BATTLE_PANEL));
        ctx.emit(GameCommand::ShowPanel {
            address: VICTORY_PANEL.into(),
            layer: UiLayer::PopUp,
            args: PanelArgs::Level(self.level),
        });
    }
}

impl Initializable for BattlePanel {
    fn initialize(&mut self, _view: &mut PanelView, _ctx: &PanelContext) {
        info!("[BattlePanel] Initialized");
    }
}

impl Showable for BattlePanel {
    fn on_show(&mut self, args: &PanelArgs, view: &mut PanelView, _ctx: &mut PanelContext) {
        let Some(level) = args.level() else {
            return;
        };
        self.level = level;
        self.timer.reset();
        self.paused = false;
        self.running = true;
        view.set_text("level", format!("Level: {}", level));
        view.set_text("info", "Battle Start!");
        info!("[BattlePanel] Battle started for level: {}", level);
    }

    fn on_close(&mut self, ctx: &mut PanelContext) {
        if self.running {
            self.running = false;
            ctx.emit(GameCommand::EndBattle { victory: false });
        }
    }
}

impl PanelBehavior for BattlePanel {
    fn on_button(&mut self, id: &str, _view: &mut PanelView, ctx: &mut PanelContext) {
        if id != "pause" {
            return;
        }
        self.paused = !self.paused;
        info!("[BattlePanel] Pause toggled: {}", self.paused);
        if self.paused {
            ctx.emit(GameCommand::PauseBattle);
        } else {
            ctx.emit(GameCommand::ResumeBattle);
        }
    }

    fn update(&mut self, dt: f32, view: &mut PanelView, ctx: &mut PanelContext) {
        if !self.running || self.paused {
            return;
        }
        let done = self.timer.tick(dt);
        view.set_text(
            "info",
            format!("Battling... {:.0}%", self.timer.progress() * 100.0),
        );
        if done {
            self.victory(ctx);
        }
    }
}
