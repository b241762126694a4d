//! Panel input and per-frame panel updates.
//!
//! Both systems build a [`PanelContext`] over the current player record and
//! forward whatever the panels emit as [`GameCommand`] messages, which
//! [`apply_game_commands`](crate::systems::commands::apply_game_commands)
//! executes later in the same frame.

use crate::events::gamecommand::GameCommand;
use crate::events::panel::PanelInput;
use crate::panels::PanelContext;
use crate::resources::datastore::DataStore;
use crate::resources::uihost::UiHost;
use crate::resources::worldtime::WorldTime;
use bevy_ecs::prelude::*;
use log::debug;

/// Route queued button presses to their panels.
pub fn dispatch_panel_input(
    mut inputs: ResMut<Messages<PanelInput>>,
    mut ui: ResMut<UiHost>,
    data: Res<DataStore>,
    mut out: MessageWriter<GameCommand>,
) {
    for input in inputs.drain() {
        let mut ctx = PanelContext::new(data.player());
        if ui.press_button(&input.address, &input.button, &mut ctx) {
            debug!("[UiHost] {} -> '{}'", input.address, input.button);
        }
        out.write_batch(ctx.into_commands());
    }
}

/// Advance panel fades and run panel updates with the scaled frame delta.
pub fn tick_panels(
    time: Res<WorldTime>,
    mut ui: ResMut<UiHost>,
    data: Res<DataStore>,
    mut out: MessageWriter<GameCommand>,
) {
    let mut ctx = PanelContext::new(data.player());
    ui.tick(time.delta, &mut ctx);
    out.write_batch(ctx.into_commands());
}
