//! Player state
//!
//! Timed conditions, vitals, hunger and the derived combat numbers the
//! turn engine adjusts.

mod condition;
mod hunger;
mod state;
mod vitals;

pub use condition::{Condition, ConditionSet, StatusFlags, Timers};
pub use hunger::HungerState;
pub use state::PlayerState;
pub use vitals::Pool;
