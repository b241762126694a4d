//! Composition root.
//!
//! [`Game`] owns the ECS [`World`] holding every manager as a resource, and
//! the per-frame [`Schedule`]. Managers are created in dependency order:
//! asset cache, table reader, data store, audio player, level registry, UI
//! host, battle session. Nothing is global; tests build as many independent
//! games as they like.
//!
//! The state hooks [`load_game`] and [`quit_game`] are registered as one-shot
//! systems and run by the game state observer when the client enters
//! `Setup` and `Quitting`.

use crate::events::gamecommand::GameCommand;
use crate::events::gamestate::observe_gamestate_change_event;
use crate::events::panel::PanelInput;
use crate::panels::{MAIN_PANEL, PanelArgs, PanelContext};
use crate::resources::address::Address;
use crate::resources::assetcache::AssetCache;
use crate::resources::assetloader::AssetLoader;
use crate::resources::audio::{AudioBackend, AudioPlayer, setup_audio, shutdown_audio};
use crate::resources::battle::BattleSession;
use crate::resources::datastore::DataStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::{GameState, GameStates, NextGameState};
use crate::resources::levelregistry::LevelRegistry;
use crate::resources::systemsstore::{LOAD_GAME, QUIT_GAME, SystemsStore};
use crate::resources::tablereader::TableReader;
use crate::resources::uihost::{UiHost, UiLayer};
use crate::resources::worldsignals::{QUIT_FLAG, SCENE_KEY, WorldSignals};
use crate::resources::worldtime::WorldTime;
use crate::systems::assets::pump_asset_loads;
use crate::systems::audio::{
    forward_audio_cmds, poll_audio_messages, sync_audio_voices, update_bevy_audio_messages,
};
use crate::systems::commands::apply_game_commands;
use crate::systems::gamestate::{check_pending_state, state_is_playing};
use crate::systems::time::update_world_time;
use crate::systems::ui::{dispatch_panel_input, tick_panels};
use bevy_ecs::prelude::*;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Enter hook of `Setup`: load the player record, show the title panel and
/// start the main music.
pub fn load_game(
    mut data: ResMut<DataStore>,
    mut ui: ResMut<UiHost>,
    mut cache: ResMut<AssetCache>,
    mut audio: ResMut<AudioPlayer>,
    mut signals: ResMut<WorldSignals>,
    mut next_state: ResMut<NextGameState>,
    config: Res<GameConfig>,
    mut out: MessageWriter<GameCommand>,
) {
    info!("[GameManager] Loading Game...");
    data.load_player();

    let mut ctx = PanelContext::new(data.player());
    ui.show(
        &mut cache,
        &MAIN_PANEL.into(),
        UiLayer::Normal,
        &PanelArgs::None,
        &mut ctx,
    );
    out.write_batch(ctx.into_commands());
    signals.set_string(SCENE_KEY, MAIN_PANEL);

    audio.play_music(&mut cache, &Address::new(config.main_music.as_str()));
    next_state.set(GameStates::Playing);
}

/// Enter hook of `Quitting`: save and ask the main loop to stop.
pub fn quit_game(
    mut data: ResMut<DataStore>,
    mut audio: ResMut<AudioPlayer>,
    mut signals: ResMut<WorldSignals>,
) {
    info!("[GameManager] Saving Game...");
    data.save_player();
    audio.stop_music();
    signals.set_flag(QUIT_FLAG);
}

pub struct Game {
    world: World,
    schedule: Schedule,
}

impl Game {
    pub fn new(config: GameConfig, loader: Arc<dyn AssetLoader>, backend: AudioBackend) -> Self {
        info!("[GameManager] Initializing Game Framework...");
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(WorldSignals::default());
        world.insert_resource(GameState::new());
        world.insert_resource(NextGameState::new());
        world.insert_resource(Messages::<GameCommand>::default());
        world.insert_resource(Messages::<PanelInput>::default());

        // Managers, leaf first.
        world.insert_resource(AssetCache::new(loader));
        world.insert_resource(TableReader::new());
        world.insert_resource(DataStore::new(&config.save_dir));
        world.insert_resource(AudioPlayer::new(config.music_volume, config.sfx_volume));
        setup_audio(&mut world, backend);
        world.insert_resource(LevelRegistry::new());
        world.insert_resource(UiHost::default());
        world.insert_resource(BattleSession::default());
        world.insert_resource(config);

        world.spawn(Observer::new(observe_gamestate_change_event));

        let mut systems_store = SystemsStore::new();
        let load_game_id = world.register_system(load_game);
        systems_store.insert(LOAD_GAME, load_game_id);
        let quit_game_id = world.register_system(quit_game);
        systems_store.insert(QUIT_GAME, quit_game_id);
        world.insert_resource(systems_store);
        world.flush();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                check_pending_state,
                pump_asset_loads,
                dispatch_panel_input.run_if(state_is_playing),
                tick_panels,
                apply_game_commands,
                // audio systems must be together
                (
                    forward_audio_cmds,
                    poll_audio_messages,
                    sync_audio_voices,
                    update_bevy_audio_messages,
                )
                    .chain(),
            )
                .chain(),
        );

        info!("[GameManager] Game Framework Initialized Successfully!");
        Game { world, schedule }
    }

    /// Request the `Setup` state. The next [`Game::tick`] runs [`load_game`].
    pub fn start(&mut self) {
        self.world
            .resource_mut::<NextGameState>()
            .set(GameStates::Setup);
    }

    /// Run [`load_game`] immediately.
    pub fn load_game(&mut self) {
        self.run_hook(LOAD_GAME);
    }

    pub fn save_game(&mut self) {
        info!("[GameManager] Saving Game...");
        self.world.resource_mut::<DataStore>().save_player();
    }

    fn run_hook(&mut self, name: &str) {
        let Some(id) = self.world.resource::<SystemsStore>().get(name).copied() else {
            warn!("[GameManager] Hook '{}' is not registered", name);
            return;
        };
        if let Err(e) = self.world.run_system(id) {
            error!("[GameManager] Hook '{}' failed: {}", name, e);
        }
    }

    /// Advance one frame by `dt` unscaled seconds.
    pub fn tick(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
        self.world.clear_trackers();
    }

    /// Queue a button press for the next frame.
    pub fn press(&mut self, address: impl Into<Address>, button: impl Into<String>) {
        self.world
            .resource_mut::<Messages<PanelInput>>()
            .write(PanelInput::new(address, button));
    }

    /// Hit-test a pointer click against the shown panels and queue the press.
    pub fn click(&mut self, x: f32, y: f32) -> bool {
        let Some((address, button)) = self.world.resource::<UiHost>().hit_test(x, y) else {
            return false;
        };
        self.press(address, button);
        true
    }

    /// Queue a command for the next frame.
    pub fn send(&mut self, command: GameCommand) {
        self.world
            .resource_mut::<Messages<GameCommand>>()
            .write(command);
    }

    pub fn reload_scene(&mut self) {
        self.send(GameCommand::ReloadScene);
    }

    /// Request the `Quitting` state: save, then raise the quit flag.
    pub fn quit(&mut self) {
        self.world
            .resource_mut::<NextGameState>()
            .set(GameStates::Quitting);
    }

    pub fn should_quit(&self) -> bool {
        self.world.resource::<WorldSignals>().has_flag(QUIT_FLAG)
    }

    /// Block until in-flight asset loads have landed, then apply them.
    pub fn finish_loads(&mut self, timeout: Duration) -> bool {
        self.world
            .resource_mut::<AssetCache>()
            .finish_pending(timeout)
    }

    pub fn state(&self) -> &GameStates {
        self.world.resource::<GameState>().get()
    }

    pub fn ui(&self) -> &UiHost {
        self.world.resource::<UiHost>()
    }

    pub fn data(&self) -> &DataStore {
        self.world.resource::<DataStore>()
    }

    pub fn data_mut(&mut self) -> Mut<'_, DataStore> {
        self.world.resource_mut::<DataStore>()
    }

    pub fn cache(&self) -> &AssetCache {
        self.world.resource::<AssetCache>()
    }

    pub fn audio(&self) -> &AudioPlayer {
        self.world.resource::<AudioPlayer>()
    }

    pub fn battle(&self) -> &BattleSession {
        self.world.resource::<BattleSession>()
    }

    pub fn levels(&self) -> &LevelRegistry {
        self.world.resource::<LevelRegistry>()
    }

    pub fn time(&self) -> &WorldTime {
        self.world.resource::<WorldTime>()
    }

    pub fn config(&self) -> &GameConfig {
        self.world.resource::<GameConfig>()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Save unless the quit hook already did, then stop the audio thread.
    pub fn shutdown(mut self) {
        if !self.should_quit() {
            self.save_game();
        }
        shutdown_audio(&mut self.world);
        info!("[GameManager] Shut down");
    }
}
