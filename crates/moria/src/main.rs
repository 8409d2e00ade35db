//! Moria-style dungeon crawler
//!
//! Terminal entry point: loads options and any saved character, then hands
//! the turn loop a crossterm-backed host.

mod host;
mod room;
mod save;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use mo_core::interface::{Request, StatField};
use mo_core::object::{EquipSlot, Item};
use mo_core::world::{GameOptions, OptionsError};
use mo_core::{GameLoop, GameState, LoopOutcome};

use host::TerminalHost;
use save::SaveError;

/// Moria-style dungeon crawler
#[derive(Parser, Debug)]
#[command(name = "moria")]
#[command(author, version, about = "Moria - descend, survive, return", long_about = None)]
struct Args {
    /// Options file (`OPTIONS=` lines)
    #[arg(short = 'o', long = "options")]
    options: Option<PathBuf>,

    /// Use the roguelike key set
    #[arg(short = 'r', long = "roguelike")]
    roguelike: bool,

    /// Seed for the random number generator
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Start in wizard (debug) mode
    #[arg(short = 'w', long = "wizard")]
    wizard: bool,

    /// Save file location
    #[arg(short = 'f', long = "save")]
    save: Option<PathBuf>,

    /// Ignore any existing save and start a new character
    #[arg(short = 'n', long = "new")]
    new_game: bool,
}

#[derive(Debug, Error)]
enum MoriaError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("options: {0}")]
    Options(#[from] OptionsError),

    #[error("save file: {0}")]
    Save(#[from] SaveError),
}

/// Leaves raw mode however the game ends
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            tracing::error!(%err, "could not leave raw mode");
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = setup_logging() {
        eprintln!("logging disabled: {err}");
    }

    match run(&args) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "fatal");
            eprintln!("moria: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String, MoriaError> {
    let options = load_options(args)?;
    let save_path = args.save.clone().unwrap_or_else(save::default_save_path);

    let state = if !args.new_game && save_path.exists() {
        let mut state = save::load_game(&save_path)?;
        state.options = options;
        tracing::info!(turn = state.dungeon.turn, depth = state.dungeon.depth, "restored character");
        state
    } else {
        new_character(options, args.wizard)
    };

    let host = TerminalHost::new(save_path.clone(), state.options.rogue_like_commands);
    let mut game = GameLoop::new(state, host);

    let outcome = {
        let _raw = RawMode::enable()?;
        game.play()
    };
    tracing::info!(?outcome, turn = game.state().dungeon.turn, "game over");

    finish(outcome, &game.into_state(), &save_path)
}

/// Tidy up after the loop: save on end of input, remove the save of a dead
/// character
fn finish(outcome: LoopOutcome, state: &GameState, save_path: &Path) -> Result<String, MoriaError> {
    match outcome {
        LoopOutcome::Died => {
            if save_path.exists() {
                save::delete_save(save_path)?;
            }
            Ok(format!(
                "Killed by {} on turn {}.",
                state.dungeon.died_from, state.dungeon.turn
            ))
        }
        LoopOutcome::Saved => Ok("Character saved.".to_string()),
        LoopOutcome::EndOfInput | LoopOutcome::NewLevel => {
            save::save_game(state, save_path)?;
            Ok("Input closed; character saved.".to_string())
        }
    }
}

/// Options file first, then command-line overrides
fn load_options(args: &Args) -> Result<GameOptions, MoriaError> {
    let path = args.options.clone().or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join("moria").join("moriarc"))
            .filter(|path| path.exists())
    });

    let options = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading options");
            GameOptions::load_from_file(&path)?
        }
        None => GameOptions::default(),
    };
    Ok(apply_overrides(args, options))
}

fn apply_overrides(args: &Args, mut options: GameOptions) -> GameOptions {
    if args.roguelike {
        options.rogue_like_commands = true;
    }
    if args.seed.is_some() {
        options.seed = args.seed;
    }
    if args.wizard {
        options.wizard_allowed = true;
    }
    options
}

/// A fresh character with a lantern and some oil
fn new_character(options: GameOptions, wizard: bool) -> GameState {
    let mut state = GameState::with_options(options);
    state.player.pack.equip(EquipSlot::Light, Item::light(0, 7500));
    if let Err(item) = state.player.pack.carry(Item::oil_flasks(5, 7500)) {
        tracing::warn!(?item, "no room for starting oil");
    }
    if wizard {
        state.dungeon.wizard = true;
        state.dungeon.noscore = true;
        state.request(Request::Stat(StatField::Winner));
    }
    state.message("Welcome to the mines.");
    tracing::info!(seed = state.rng.seed(), "new character");
    state
}

/// Log to a file so the terminal stays clean
fn setup_logging() -> io::Result<()> {
    let mut log_dir = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
    log_dir.push("moria-rs");
    log_dir.push("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "moria.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    // Leak the guard to keep the file writer alive
    std::mem::forget(guard);

    tracing::info!("Log file: {}/moria.log", log_dir.display());
    Ok(())
}
