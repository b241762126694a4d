//! Execution of [`GameCommand`]s.
//!
//! Commands are applied depth-first: the commands a panel emits while one
//! command runs are executed right after it, before the rest of the queue.
//! This keeps the ordering panels would observe with direct calls.

use crate::events::gamecommand::GameCommand;
use crate::panels::{MAIN_PANEL, PanelArgs, PanelContext};
use crate::resources::assetcache::AssetCache;
use crate::resources::audio::AudioPlayer;
use crate::resources::battle::BattleSession;
use crate::resources::datastore::DataStore;
use crate::resources::gamestate::{GameStates, NextGameState};
use crate::resources::levelregistry::LevelRegistry;
use crate::resources::tablereader::TableReader;
use crate::resources::uihost::{UiHost, UiLayer};
use crate::resources::worldsignals::{SCENE_KEY, WorldSignals};
use crate::resources::worldtime::WorldTime;
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use log::{info, warn};
use std::collections::VecDeque;

/// Upper bound on commands applied in one frame. Guards against panels that
/// keep emitting commands in response to each other.
pub const MAX_COMMANDS_PER_FRAME: usize = 256;

/// Every manager a [`GameCommand`] can target.
#[derive(SystemParam)]
pub struct GameManagers<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub cache: ResMut<'w, AssetCache>,
    pub ui: ResMut<'w, UiHost>,
    pub data: ResMut<'w, DataStore>,
    pub audio: ResMut<'w, AudioPlayer>,
    pub tables: ResMut<'w, TableReader>,
    pub levels: ResMut<'w, LevelRegistry>,
    pub battle: ResMut<'w, BattleSession>,
    pub time: ResMut<'w, WorldTime>,
    pub next_state: ResMut<'w, NextGameState>,
    pub signals: ResMut<'w, WorldSignals>,
}

impl GameManagers<'_, '_> {
    /// Apply one command and return the commands panels emitted meanwhile.
    pub fn apply(&mut self, cmd: GameCommand) -> Vec<GameCommand> {
        let mut ctx = PanelContext::new(self.data.player());
        match cmd {
            GameCommand::ShowPanel {
                address,
                layer,
                args,
            } => {
                self.ui.show(&mut self.cache, &address, layer, &args, &mut ctx);
            }
            GameCommand::ShowPanelAnimated {
                address,
                layer,
                args,
                duration,
            } => {
                self.ui
                    .show_animated(&mut self.cache, &address, layer, &args, duration, &mut ctx);
            }
            GameCommand::HidePanel(address) => {
                self.ui.hide(&address, &mut ctx);
            }
            GameCommand::HidePanelAnimated { address, duration } => {
                self.ui.hide_animated(&address, duration);
            }
            GameCommand::ClosePanel(address) => {
                self.ui.close(&mut self.cache, &address, &mut ctx);
            }
            GameCommand::CloseAllPanels => {
                self.ui.close_all(&mut self.cache, &mut ctx);
            }
            GameCommand::ReloadScene => {
                info!("[Scene] Reloading");
                self.ui.close_all(&mut self.cache, &mut ctx);
                self.ui.show(
                    &mut self.cache,
                    &MAIN_PANEL.into(),
                    UiLayer::Normal,
                    &PanelArgs::None,
                    &mut ctx,
                );
                self.signals.set_string(SCENE_KEY, MAIN_PANEL);
            }
            other => {
                drop(ctx);
                self.apply_managers(other);
                return Vec::new();
            }
        }
        ctx.into_commands()
    }

    fn apply_managers(&mut self, cmd: GameCommand) {
        match cmd {
            GameCommand::StartBattle { level_id } => {
                let enemies =
                    match self
                        .levels
                        .start_level(&mut self.tables, &mut self.cache, level_id)
                    {
                        Some(level) => level.instantiate_enemies(&mut self.tables, &mut self.cache),
                        None => {
                            warn!("[BattleSession] Level {} unavailable, battling without enemies", level_id);
                            Vec::new()
                        }
                    };
                self.battle
                    .start(level_id, enemies, &mut self.commands, &mut self.time);
            }
            GameCommand::EndBattle { victory } => {
                self.battle.end(victory, &mut self.commands, &mut self.time);
            }
            GameCommand::PauseBattle => self.battle.pause(&mut self.time),
            GameCommand::ResumeBattle => self.battle.resume(&mut self.time),
            GameCommand::CompleteLevel { level_id, gold } => {
                self.data.complete_level(level_id, gold);
            }
            GameCommand::PlayMusic(address) => {
                self.audio.play_music(&mut self.cache, &address);
            }
            GameCommand::StopMusic => self.audio.stop_music(),
            GameCommand::PlaySfx(address) => {
                self.audio.play_sfx(&mut self.cache, &address);
            }
            GameCommand::SaveGame => self.data.save_player(),
            GameCommand::Quit => {
                info!("[GameManager] Quit requested");
                self.next_state.set(GameStates::Quitting);
            }
            // Panel commands are handled in `apply`.
            _ => {}
        }
    }
}

/// Drain the [`GameCommand`] queue and execute it against the managers.
pub fn apply_game_commands(mut queue: ResMut<Messages<GameCommand>>, mut managers: GameManagers) {
    let mut pending: VecDeque<GameCommand> = queue.drain().collect();
    let mut applied = 0;
    while let Some(cmd) = pending.pop_front() {
        if applied == MAX_COMMANDS_PER_FRAME {
            warn!(
                "[GameManager] Command limit reached, dropping {} commands",
                pending.len() + 1
            );
            break;
        }
        applied += 1;
        let follow_ups = managers.apply(cmd);
        for follow_up in follow_ups.into_iter().rev() {
            pending.push_front(follow_up);
        }
    }
}
