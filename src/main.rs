/// Entry point: load config and map, start the Coordinator, agents and
/// keyboard input, then wait for the game to end.

mod agents;
mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use agents::Roster;
use config::GameConfig;
use sim::coordinator::Coordinator;
use sim::level::load_map;
use sim::proposal;
use sim::world::{Phase, World, COINS_TO_WIN};
use ui::renderer::{self, Renderer};

#[derive(Parser)]
#[command(name = "gridchase")]
#[command(about = "Collect five coins before the enemies catch you", version)]
struct Cli {
    /// Map file (overrides `general.map_file`)
    map: Option<PathBuf>,

    /// Config file (default: config.toml next to the binary or in CWD)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible enemy and coin behavior
    #[arg(short, long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GameConfig::load(cli.config.as_deref());
    init_tracing(config.log_file.as_deref())?;

    let map_path = cli.map.unwrap_or_else(|| config.map_file.clone());
    let seed = cli.seed.or(config.seed);
    let mut world = load_map(&map_path)?;
    info!(
        map = %map_path.display(),
        rows = world.grid.height(),
        cols = world.grid.width(),
        coins = world.coins.len(),
        buttons = world.buttons.len(),
        ?seed,
        "map loaded"
    );
    let roster = Roster::prepare(&mut world, &config.timing, seed);

    let mut screen = Renderer::new();
    if let Err(e) = screen.init() {
        let _ = renderer::cleanup();
        return Err(e).context("terminal init failed");
    }

    let result = play(world, roster, screen).await;

    if let Err(e) = renderer::cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = &result {
        error!("{e:#}");
    }

    match result? {
        Some(Phase::Won) => println!("All {COINS_TO_WIN} coins collected. You win!"),
        Some(Phase::Lost) => println!("Caught by an enemy. Game over!"),
        Some(Phase::Playing) | None => println!("Game aborted."),
    }
    Ok(())
}

/// Run one game. Returns the final phase, or None if the player quit
/// while still playing.
async fn play(world: World, roster: Roster, screen: Renderer) -> Result<Option<Phase>> {
    let (tx, rx) = proposal::queue();
    let (coordinator, snapshots) = Coordinator::new(world, rx, screen);
    let mut agents = roster.spawn(&tx, &snapshots);

    let mut game = tokio::spawn(coordinator.run());
    let mut input = tokio::spawn(ui::input::run(tx));

    let outcome = tokio::select! {
        done = &mut game => {
            let phase = done.context("coordinator task failed")??;
            // Keep the final frame up until a quit key.
            input.await.context("input task failed")??;
            Some(phase)
        }
        quit = &mut input => {
            quit.context("input task failed")??;
            game.abort();
            None
        }
    };

    agents.shutdown().await;
    info!(?outcome, "session over");
    Ok(outcome)
}

/// Log to a file; the terminal belongs to the renderer.
/// Filter from RUST_LOG, default `info`.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}
