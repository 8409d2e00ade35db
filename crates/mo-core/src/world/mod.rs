//! World state and per-turn updates

mod context;
pub mod disturb;
pub mod enchant;
mod errors;
mod messages;
mod options;
pub mod regen;
pub mod timeout;

pub use context::DungeonContext;
pub use disturb::{RestRefusal, disturb, end_find, rest_off, search_off, search_on, start_rest};
pub use errors::OptionsError;
pub use messages::MessageLog;
pub use options::GameOptions;
pub use timeout::{Phase, TICK_ORDER, TimedEffect, Transition};
