//! Character save files
//!
//! A save is the serialized [`GameState`] behind a small versioned header.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mo_core::GameState;

/// Current save file format version
pub const SAVE_VERSION: u32 = 1;

/// Save/restore errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Save file not found")]
    NotFound,

    #[error("Incompatible save version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("Invalid save file header")]
    InvalidHeader,
}

/// Save file header for versioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveHeader {
    pub magic: String,
    pub version: u32,
    /// Game turn at save time
    pub turn: u64,
    pub depth: i32,
}

impl SaveHeader {
    const MAGIC: &'static str = "MORS";

    pub fn new(state: &GameState) -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: SAVE_VERSION,
            turn: state.dungeon.turn,
            depth: state.dungeon.depth,
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.magic != Self::MAGIC {
            return Err(SaveError::InvalidHeader);
        }
        if self.version != SAVE_VERSION {
            return Err(SaveError::IncompatibleVersion {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SaveFileRef<'a> {
    header: SaveHeader,
    state: &'a GameState,
}

#[derive(Deserialize)]
struct SaveFile {
    header: SaveHeader,
    state: GameState,
}

/// Save game state to a file
pub fn save_game(state: &GameState, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let save_file = SaveFileRef {
        header: SaveHeader::new(state),
        state,
    };
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &save_file)?;
    Ok(())
}

/// Load game state from a file
pub fn load_game(path: impl AsRef<Path>) -> Result<GameState, SaveError> {
    let file = File::open(path).map_err(|_| SaveError::NotFound)?;
    let save_file: SaveFile = serde_json::from_reader(BufReader::new(file))?;
    save_file.header.validate()?;
    Ok(save_file.state)
}

/// Delete a save file
pub fn delete_save(path: impl AsRef<Path>) -> Result<(), SaveError> {
    std::fs::remove_file(path)?;
    Ok(())
}

/// Default location of the single character save
pub fn default_save_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("moria-rs");
    path.push("saves");
    if let Err(err) = std::fs::create_dir_all(&path) {
        tracing::warn!(%err, dir = %path.display(), "could not create save directory");
    }
    path.push("character.json");
    path
}
