//! Carried and worn item instances

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::{TV_FLASK, TV_LIGHT, TV_MAX_ENCHANT, TV_MIN_ENCHANT};

bitflags! {
    /// Magical properties of an item
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ItemFlags: u32 {
        const STR = 0x0000_0001;
        const INT = 0x0000_0002;
        const WIS = 0x0000_0004;
        const DEX = 0x0000_0008;
        const CON = 0x0000_0010;
        const CHR = 0x0000_0020;
        const SEARCH = 0x0000_0040;
        const SLOW_DIGEST = 0x0000_0080;
        const STEALTH = 0x0000_0100;
        const AGGRAVATE = 0x0000_0200;
        const TELEPORT = 0x0000_0400;
        const REGEN = 0x0000_0800;
        const SPEED = 0x0000_1000;
        const SLAY_DRAGON = 0x0000_2000;
        const SLAY_ANIMAL = 0x0000_4000;
        const SLAY_EVIL = 0x0000_8000;
        const SLAY_UNDEAD = 0x0001_0000;
        const FROST_BRAND = 0x0002_0000;
        const FLAME_TONGUE = 0x0004_0000;
        const RES_FIRE = 0x0008_0000;
        const RES_ACID = 0x0010_0000;
        const RES_COLD = 0x0020_0000;
        const SUST_STAT = 0x0040_0000;
        const FREE_ACT = 0x0080_0000;
        const SEE_INVIS = 0x0100_0000;
        const RES_LIGHT = 0x0200_0000;
        const FFALL = 0x0400_0000;
        const BLIND = 0x0800_0000;
        const TIMID = 0x1000_0000;
        const TUNNEL = 0x2000_0000;
        const INFRA = 0x4000_0000;
        const CURSED = 0x8000_0000;

        /// Properties whose strength is the item's pval
        const PVAL_BONUSES = 0x4000_107f;
        /// Properties that are good regardless of pval
        const BENEFICIAL = 0x07ff_e980;
    }
}

impl Serialize for ItemFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ItemFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(ItemFlags::from_bits_retain(bits))
    }
}

bitflags! {
    /// What the player knows about an item
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Ident: u8 {
        /// Player sensed "something about" it
        const MAGIK = 0x01;
        const DAMNED = 0x02;
        const EMPTY = 0x04;
        /// Pluses fully identified
        const KNOWN2 = 0x08;
        const STORE_BOUGHT = 0x10;
    }
}

impl Serialize for Ident {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Ident::from_bits_truncate(bits))
    }
}

/// One stack of items
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    /// Category (tval)
    pub tval: u8,
    /// Kind within the category
    pub subval: u16,
    pub flags: ItemFlags,
    pub to_hit: i32,
    pub to_dam: i32,
    pub to_ac: i32,
    /// Charges, fuel or bonus strength depending on the category
    pub pval: i32,
    pub quantity: u16,
    pub ident: Ident,
}

impl Item {
    pub fn new(tval: u8, subval: u16) -> Self {
        Self {
            tval,
            subval,
            quantity: 1,
            ..Self::default()
        }
    }

    /// A light source holding `fuel` turns
    pub fn light(subval: u16, fuel: i32) -> Self {
        Self {
            pval: fuel,
            ..Self::new(TV_LIGHT, subval)
        }
    }

    /// `quantity` flasks of oil, each worth `fuel` turns of lamp light
    pub fn oil_flasks(quantity: u16, fuel: i32) -> Self {
        Self {
            pval: fuel,
            quantity,
            ..Self::new(TV_FLASK, 0)
        }
    }

    pub fn is_cursed(&self) -> bool {
        self.flags.contains(ItemFlags::CURSED)
    }

    /// Weapon or armour whose pluses could be unknown
    pub fn is_enchantable(&self) -> bool {
        (TV_MIN_ENCHANT..=TV_MAX_ENCHANT).contains(&self.tval)
    }

    /// True for an unidentified, uncursed weapon or armour with a good
    /// enchantment the player has not yet sensed
    pub fn has_hidden_enchantment(&self) -> bool {
        if !self.is_enchantable() || self.is_cursed() {
            return false;
        }
        if self.ident.intersects(Ident::KNOWN2 | Ident::MAGIK) {
            return false;
        }
        if self.to_hit > 0 || self.to_dam > 0 || self.to_ac > 0 {
            return true;
        }
        if self.flags.intersects(ItemFlags::PVAL_BONUSES) && self.pval > 0 {
            return true;
        }
        self.flags.intersects(ItemFlags::BENEFICIAL)
    }
}
