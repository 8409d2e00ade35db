//! Hit points and mana with fixed-point regeneration

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SHORT;

/// One unit in 16.16 fixed point
const FIXED_ONE: i64 = 0x1_0000;

/// A current/maximum pair carrying a 16-bit fractional remainder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub cur: i32,
    pub max: i32,
    pub frac: u16,
}

impl Pool {
    pub const fn new(max: i32) -> Self {
        Self { cur: max, max, frac: 0 }
    }

    pub const fn is_full(&self) -> bool {
        self.cur >= self.max
    }

    /// Add a 16.16 fixed-point amount, carrying the fraction into `cur`
    pub fn gain_fixed(&mut self, amount: i64) {
        let old = self.cur;
        let whole = (amount >> 16) as i32;
        self.cur = self.cur.saturating_add(whole);
        if self.cur < 0 && old > 0 {
            self.cur = MAX_SHORT;
        }

        let frac = (amount & 0xFFFF) + i64::from(self.frac);
        if frac >= FIXED_ONE {
            self.frac = (frac - FIXED_ONE) as u16;
            self.cur = self.cur.saturating_add(1);
        } else {
            self.frac = frac as u16;
        }
    }

    /// Regenerate `percent`/65536 of the maximum plus a flat `base`
    ///
    /// Caps at the maximum (clearing the fraction). Returns true when the
    /// whole-point value changed.
    pub fn regenerate(&mut self, percent: i32, base: i32) -> bool {
        let old = self.cur;
        self.gain_fixed(i64::from(self.max) * i64::from(percent) + i64::from(base));
        if self.cur >= self.max {
            self.cur = self.max;
            self.frac = 0;
        }
        old != self.cur
    }

    /// Lower the maximum, pulling `cur` down with it
    pub fn lower_max(&mut self, amount: i32) -> bool {
        self.max -= amount;
        if self.cur > self.max {
            self.cur = self.max;
            self.frac = 0;
            true
        } else {
            false
        }
    }
}
