//! mo-core: Turn engine for a Moria-style dungeon crawler
//!
//! This crate owns the game clock, the timed player conditions and the
//! command decoder and dispatcher. Drawing, input, the map and saving are
//! reached through the traits in [`interface`].

pub mod action;
pub mod interface;
pub mod object;
pub mod player;
pub mod world;

mod consts;
mod gameloop;
mod rng;

pub use consts::*;
pub use gameloop::{GameLoop, GameState, LoopOutcome, TurnPhase};
pub use rng::GameRng;
