//! Timed player conditions and the status bitmask

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Conditions driven by a countdown timer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Condition {
    Hero = 0,
    SuperHero = 1,
    Blind = 2,
    Confused = 3,
    Afraid = 4,
    Poisoned = 5,
    Fast = 6,
    Slow = 7,
    Hallucinating = 8,
    Paralysed = 9,
    ProtectedFromEvil = 10,
    Invulnerable = 11,
    Blessed = 12,
    ResistHeat = 13,
    ResistCold = 14,
    DetectInvisible = 15,
    Infravision = 16,
}

impl Condition {
    /// The bit this condition owns in a [`ConditionSet`]
    pub const fn flag(self) -> ConditionSet {
        ConditionSet::from_bits_retain(1 << self as u8)
    }
}

bitflags! {
    /// Cache of which conditions have had their activation run
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConditionSet: u32 {
        const HERO = 1 << 0;
        const SUPER_HERO = 1 << 1;
        const BLIND = 1 << 2;
        const CONFUSED = 1 << 3;
        const AFRAID = 1 << 4;
        const POISONED = 1 << 5;
        const FAST = 1 << 6;
        const SLOW = 1 << 7;
        const HALLUCINATING = 1 << 8;
        const PARALYSED = 1 << 9;
        const PROTECTED_FROM_EVIL = 1 << 10;
        const INVULNERABLE = 1 << 11;
        const BLESSED = 1 << 12;
        const RESIST_HEAT = 1 << 13;
        const RESIST_COLD = 1 << 14;
        const DETECT_INVISIBLE = 1 << 15;
        const INFRAVISION = 1 << 16;
    }
}

impl ConditionSet {
    /// Project counters onto the set of conditions that should be active
    pub fn derive(timers: &Timers) -> Self {
        Condition::iter()
            .filter(|&c| timers.get(c) > 0)
            .fold(Self::empty(), |set, c| set | c.flag())
    }
}

impl Serialize for ConditionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConditionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(ConditionSet::from_bits(bits).unwrap_or_else(|| {
            tracing::error!(bits, "unknown condition bits in saved state");
            ConditionSet::from_bits_truncate(bits)
        }))
    }
}

bitflags! {
    /// Non-timer status bits: hunger tiers, modes and pending redraws
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusFlags: u32 {
        const HUNGRY = 0x0001;
        const WEAK = 0x0002;
        const SEARCH = 0x0004;
        const REST = 0x0008;
        /// State line is showing a repeat count
        const REPEAT = 0x0010;
        const SPEED = 0x0020;
        /// State line is showing "Paralysed"
        const PARALYSED = 0x0040;
        const ARMOR = 0x0080;
        const HP = 0x0100;
        const MANA = 0x0200;
        const STATS = 0x0400;
        /// Weapon or pack weight must be rechecked against strength
        const STR_WGT = 0x0800;
        const STUDY = 0x1000;
    }
}

impl Serialize for StatusFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatusFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(StatusFlags::from_bits(bits).unwrap_or_else(|| {
            tracing::error!(bits, "unknown status bits in saved state");
            StatusFlags::from_bits_truncate(bits)
        }))
    }
}

/// Turn counters; 0 is inactive, positive is turns remaining
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timers {
    pub hero: i32,
    pub super_hero: i32,
    pub blind: i32,
    pub confused: i32,
    pub afraid: i32,
    pub poisoned: i32,
    pub fast: i32,
    pub slow: i32,
    pub hallucinating: i32,
    pub paralysis: i32,
    pub protect_evil: i32,
    pub invulnerable: i32,
    pub blessed: i32,
    pub resist_heat: i32,
    pub resist_cold: i32,
    pub detect_invisible: i32,
    pub infravision: i32,
    /// Positive counts down; `-MAX_SHORT` rests until hp and mana are full
    pub rest: i32,
    pub word_of_recall: i32,
}

impl Timers {
    pub fn get(&self, condition: Condition) -> i32 {
        match condition {
            Condition::Hero => self.hero,
            Condition::SuperHero => self.super_hero,
            Condition::Blind => self.blind,
            Condition::Confused => self.confused,
            Condition::Afraid => self.afraid,
            Condition::Poisoned => self.poisoned,
            Condition::Fast => self.fast,
            Condition::Slow => self.slow,
            Condition::Hallucinating => self.hallucinating,
            Condition::Paralysed => self.paralysis,
            Condition::ProtectedFromEvil => self.protect_evil,
            Condition::Invulnerable => self.invulnerable,
            Condition::Blessed => self.blessed,
            Condition::ResistHeat => self.resist_heat,
            Condition::ResistCold => self.resist_cold,
            Condition::DetectInvisible => self.detect_invisible,
            Condition::Infravision => self.infravision,
        }
    }

    pub fn get_mut(&mut self, condition: Condition) -> &mut i32 {
        match condition {
            Condition::Hero => &mut self.hero,
            Condition::SuperHero => &mut self.super_hero,
            Condition::Blind => &mut self.blind,
            Condition::Confused => &mut self.confused,
            Condition::Afraid => &mut self.afraid,
            Condition::Poisoned => &mut self.poisoned,
            Condition::Fast => &mut self.fast,
            Condition::Slow => &mut self.slow,
            Condition::Hallucinating => &mut self.hallucinating,
            Condition::Paralysed => &mut self.paralysis,
            Condition::ProtectedFromEvil => &mut self.protect_evil,
            Condition::Invulnerable => &mut self.invulnerable,
            Condition::Blessed => &mut self.blessed,
            Condition::ResistHeat => &mut self.resist_heat,
            Condition::ResistCold => &mut self.resist_cold,
            Condition::DetectInvisible => &mut self.detect_invisible,
            Condition::Infravision => &mut self.infravision,
        }
    }

    /// Shorten a condition to expire on its next tick
    pub fn cure(&mut self, condition: Condition) -> bool {
        let counter = self.get_mut(condition);
        if *counter > 1 {
            *counter = 1;
            true
        } else {
            false
        }
    }
}
