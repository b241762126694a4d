//! Card game client entry point.
//!
//! Built on:
//! - **bevy_ecs** for the world holding every manager and the frame schedule
//! - **raylib** (optional `raylib` feature) for the window, panel drawing and audio
//!
//! Without the `raylib` feature, or with `--headless`, the client runs an
//! autopilot through the demo flow: title screen, card build, one battle,
//! victory, back to the title screen, quit.
//!
//! # Tooling
//!
//! `--bundle-assets`, `--catalog` and `--clear-bundles` run the asset
//! bundler and exit without starting the game.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --headless
//! cargo run --release --features raylib
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use cardframe::bundler;
use cardframe::game::Game;
use cardframe::panels::{CARD_BUILD_PANEL, MAIN_PANEL, VICTORY_PANEL};
use cardframe::resources::address::Address;
use cardframe::resources::assetloader::FsAssetLoader;
use cardframe::resources::audio::AudioBackend;
use cardframe::resources::gameconfig::GameConfig;
use cardframe::resources::uihost::PanelState;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const HEADLESS_DT: f32 = 1.0 / 60.0;

/// Card game client
#[derive(Parser)]
#[command(version, about = "Card game client with addressable assets and layered UI panels.")]
struct Cli {
    /// Path of the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Run the scripted demo flow without a window.
    #[arg(long)]
    headless: bool,

    /// Frame limit for the headless run.
    #[arg(long, default_value_t = 1200)]
    frames: u32,

    /// Bundle the asset source tree into the asset root and exit.
    /// Optionally provide the source tree (default: `bundle_source` from the config).
    #[arg(long, value_name = "SRC")]
    bundle_assets: Option<Option<PathBuf>>,

    /// Print the bundle catalog and exit.
    #[arg(long)]
    catalog: bool,

    /// Remove bundled assets and the catalog, then exit.
    #[arg(long)]
    clear_bundles: bool,

    /// Delete the save file before starting.
    #[arg(long)]
    reset_save: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{}, using defaults", e);
    }

    // Early-exit: bundling tools (no game, no audio)
    if let Some(maybe_src) = cli.bundle_assets {
        let src = maybe_src.unwrap_or_else(|| config.bundle_source.clone());
        match bundler::bundle_assets(&src, &config.asset_root) {
            Ok(report) => println!(
                "Bundled {} assets into {}",
                report.total(),
                config.asset_root.display()
            ),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }
    if cli.catalog {
        match bundler::read_catalog(&config.asset_root) {
            Ok(catalog) => print!("{}", bundler::format_catalog(&catalog)),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }
    if cli.clear_bundles {
        match bundler::clear_bundles(&config.asset_root) {
            Ok(removed) => println!("Removed {} bundled assets", removed),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    log::info!("Hello, world! This is the card game client!");
    let loader = Arc::new(FsAssetLoader::new(config.asset_root.clone()));

    #[cfg(feature = "raylib")]
    if !cli.headless {
        run_windowed(config, loader, cli.reset_save);
        return;
    }

    let mut game = Game::new(config, loader, AudioBackend::Null);
    if cli.reset_save {
        game.data_mut().reset_player();
    }
    run_headless(&mut game, cli.frames);
    game.shutdown();
}

/// Panel to wait for, and the button pressed once it is shown.
const AUTOPILOT: [(&str, &str); 5] = [
    (MAIN_PANEL, "start"),
    (CARD_BUILD_PANEL, "start_battle"),
    (VICTORY_PANEL, "continue"),
    (CARD_BUILD_PANEL, "back"),
    (MAIN_PANEL, "quit"),
];

fn run_headless(game: &mut Game, frames: u32) {
    game.start();
    let mut step = 0;
    for frame in 0..frames {
        game.tick(HEADLESS_DT);
        game.finish_loads(Duration::from_millis(100));
        if game.should_quit() {
            log::info!("Quit after {} frames", frame + 1);
            return;
        }
        let Some(&(panel, button)) = AUTOPILOT.get(step) else {
            continue;
        };
        let address = Address::new(panel);
        if game.ui().state(&address) == Some(PanelState::Shown) {
            log::info!("[Autopilot] {} -> {}", panel, button);
            game.press(address, button);
            step += 1;
        }
    }
    log::warn!(
        "Frame limit reached at autopilot step {}/{}",
        step,
        AUTOPILOT.len()
    );
}

#[cfg(feature = "raylib")]
fn run_windowed(config: GameConfig, loader: Arc<FsAssetLoader>, reset_save: bool) {
    use cardframe::systems::render::{poll_click, render_panels};

    let (width, height) = config.window_size();
    let target_fps = config.target_fps;
    let (mut rl, thread) = raylib::init()
        .size(width as i32, height as i32)
        .title("Card Game")
        .build();
    rl.set_target_fps(target_fps);
    // Disable ESC to exit
    rl.set_exit_key(None);

    let mut game = Game::new(config, loader, AudioBackend::Raylib);
    if reset_save {
        game.data_mut().reset_player();
    }
    game.start();

    // --------------- Main loop ---------------
    while !rl.window_should_close() && !game.should_quit() {
        if let Some((x, y)) = poll_click(&rl) {
            game.click(x, y);
        }
        game.tick(rl.get_frame_time());

        let mut d = rl.begin_drawing(&thread);
        render_panels(&mut d, game.ui());
    }

    game.shutdown();
}
