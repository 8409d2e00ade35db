//! Player hunger state

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::consts::{
    PLAYER_FOOD_ALERT, PLAYER_FOOD_FAINT, PLAYER_FOOD_FULL, PLAYER_FOOD_WEAK,
    PLAYER_REGEN_FAINT, PLAYER_REGEN_NORMAL, PLAYER_REGEN_WEAK,
};

/// Hunger state levels
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum HungerState {
    /// Gorged
    Full = 0,

    /// Normal state
    #[default]
    NotHungry = 1,

    /// Getting hungry
    Hungry = 2,

    /// Weak from hunger
    Weak = 3,

    /// May faint at any moment
    Fainting = 4,

    /// Food has run out; starvation damage every turn
    Starving = 5,
}

impl HungerState {
    /// Lowest food value still in this state
    pub const fn threshold(&self) -> i32 {
        match self {
            HungerState::Full => PLAYER_FOOD_FULL,
            HungerState::NotHungry => PLAYER_FOOD_ALERT,
            HungerState::Hungry => PLAYER_FOOD_WEAK,
            HungerState::Weak => PLAYER_FOOD_FAINT,
            HungerState::Fainting => 0,
            HungerState::Starving => i32::MIN,
        }
    }

    /// Calculate hunger state from a food counter
    pub fn from_food(food: i32) -> Self {
        if food >= PLAYER_FOOD_FULL {
            HungerState::Full
        } else if food >= PLAYER_FOOD_ALERT {
            HungerState::NotHungry
        } else if food >= PLAYER_FOOD_WEAK {
            HungerState::Hungry
        } else if food >= PLAYER_FOOD_FAINT {
            HungerState::Weak
        } else if food >= 0 {
            HungerState::Fainting
        } else {
            HungerState::Starving
        }
    }

    /// Base regeneration rate allowed at this hunger level
    pub const fn regen_rate(&self) -> i32 {
        match self {
            HungerState::Full | HungerState::NotHungry | HungerState::Hungry => {
                PLAYER_REGEN_NORMAL
            }
            HungerState::Weak => PLAYER_REGEN_WEAK,
            HungerState::Fainting => PLAYER_REGEN_FAINT,
            HungerState::Starving => 0,
        }
    }

    /// At or past the "weak" edge
    pub const fn is_weak(&self) -> bool {
        matches!(
            self,
            HungerState::Weak | HungerState::Fainting | HungerState::Starving
        )
    }

    /// Get status line display string
    pub const fn status_string(&self) -> Option<&'static str> {
        match self {
            HungerState::Full => None,
            HungerState::NotHungry => None,
            HungerState::Hungry => Some("Hungry"),
            HungerState::Weak | HungerState::Fainting | HungerState::Starving => Some("Weak"),
        }
    }
}
