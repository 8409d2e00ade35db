//! The player aggregate

use serde::{Deserialize, Serialize};

use super::{ConditionSet, HungerState, Pool, StatusFlags, Timers};
use crate::consts::{DEFAULT_FOOD_DIGESTED, PLAYER_FOOD_FULL};
use crate::object::{ItemFlags, Pack};

/// Everything about the player that the turn engine touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub hp: Pool,
    pub mana: Pool,

    pub timers: Timers,
    /// Conditions whose activation has run
    pub conditions: ConditionSet,
    pub status: StatusFlags,

    pub food: i32,
    /// Food burned per turn
    pub food_digested: i32,

    /// Negative is faster
    pub speed: i32,
    pub level: u32,
    pub exp: i64,
    /// Constitution in 3..=118 (18/xx encoded as 18 + xx)
    pub constitution: u8,

    // Intrinsics
    pub regenerate: bool,
    pub random_teleport: bool,
    pub innate_see_invisible: bool,
    pub see_invisible: bool,
    pub see_infra: i32,

    // Combat
    pub bth: i32,
    pub bthb: i32,
    pub pac: i32,
    pub dis_ac: i32,

    /// Light source is burning
    pub light_on: bool,
    pub pack: Pack,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            hp: Pool::new(10),
            mana: Pool::new(0),
            timers: Timers::default(),
            conditions: ConditionSet::empty(),
            status: StatusFlags::empty(),
            food: PLAYER_FOOD_FULL - 1,
            food_digested: DEFAULT_FOOD_DIGESTED,
            speed: 0,
            level: 1,
            exp: 0,
            constitution: 10,
            regenerate: false,
            random_teleport: false,
            innate_see_invisible: false,
            see_invisible: false,
            see_infra: 0,
            bth: 0,
            bthb: 0,
            pac: 0,
            dis_ac: 0,
            light_on: false,
            pack: Pack::new(),
        }
    }
}

impl PlayerState {
    /// Constitution hit point adjustment
    pub fn con_adj(&self) -> i32 {
        let con = i32::from(self.constitution);
        if con < 7 {
            con - 7
        } else if con < 17 {
            0
        } else if con == 17 {
            1
        } else if con < 94 {
            2
        } else if con < 117 {
            3
        } else {
            4
        }
    }

    pub fn hunger(&self) -> HungerState {
        HungerState::from_food(self.food)
    }

    /// Hero or super-hero is running
    pub fn is_heroic(&self) -> bool {
        self.timers.hero + self.timers.super_hero > 0
    }

    pub fn is_resting(&self) -> bool {
        self.timers.rest != 0
    }

    pub fn is_searching(&self) -> bool {
        self.status.contains(StatusFlags::SEARCH)
    }

    /// See-invisible from race and worn items alone
    pub fn base_see_invisible(&self) -> bool {
        self.innate_see_invisible || self.pack.worn_flags().contains(ItemFlags::SEE_INVIS)
    }

    /// Conditions the counters say should be active
    pub fn derived_conditions(&self) -> ConditionSet {
        ConditionSet::derive(&self.timers)
    }
}
