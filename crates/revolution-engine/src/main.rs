//! Interactive binary for the Revolution narrative engine.
//!
//! Wires configuration, logging, save storage and the game together and
//! hands stdin to the command loop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `revolution-config.yaml` (or the path in
//!    `REVOLUTION_CONFIG`) and apply environment overrides
//! 2. Initialize structured logging (tracing) to stderr
//! 3. Open the save directory
//! 4. Build the game over the embedded content and attach the console
//! 5. Begin the story and run the command loop until `quit`
//! 6. Autosave on the way out
//!
//! If the command loop fails, the current state is written to the
//! emergency slot before the error is returned.

mod commands;
mod console;
mod error;
mod repl;

use std::path::PathBuf;

use revolution_core::{Game, GameConfig};
use revolution_db::{FileStore, SaveSlot};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleObserver;
use crate::error::EngineError;

/// Config file read when `REVOLUTION_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "revolution-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if startup fails or stdin cannot be read.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config);
    info!(
        seed = config.game.seed,
        start_year = config.game.start_year,
        final_year = config.game.final_year,
        final_season = config.game.final_season.as_str(),
        save_dir = config.persistence.save_dir,
        "revolution-engine starting"
    );

    // 3. Open the save directory.
    let store = FileStore::open(PathBuf::from(&config.persistence.save_dir))?;
    info!(dir = %store.dir().display(), "Save store opened");

    // 4. Build the game.
    let autosave = config.persistence.autosave;
    let game = Game::from_config(config, Box::new(store))?;
    game.with_session(|s| s.subscribe(Box::new(ConsoleObserver)));

    // 5. Play.
    game.begin();
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    if let Err(e) = repl::run(&game, stdin).await {
        error!(error = %e, "Command loop failed");
        game.emergency_save(&e.to_string());
        return Err(e.into());
    }

    // 6. Autosave.
    if autosave && !game.save_game(SaveSlot::AUTOSAVE.number()) {
        error!("Autosave on exit failed");
    }

    info!("revolution-engine shutdown complete");
    Ok(())
}

/// Load the game configuration.
///
/// Reads `REVOLUTION_CONFIG` or `revolution-config.yaml` relative to the
/// working directory; a missing file yields the defaults.
fn load_config() -> Result<GameConfig, EngineError> {
    let path = std::env::var("REVOLUTION_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let mut config = if path.exists() {
        GameConfig::from_file(&path)?
    } else {
        GameConfig::default()
    };
    config.persistence.apply_env_overrides();
    Ok(config)
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr so
/// it does not interleave with the story on stdout.
fn init_logging(config: &GameConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
