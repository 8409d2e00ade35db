//! Player pack and equipment

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use super::{Item, ItemFlags};
use crate::consts::INVEN_PACK_SLOTS;

/// Equipment slots, in equipment list order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumCount,
)]
pub enum EquipSlot {
    Wield,
    Head,
    Neck,
    Body,
    Arm,
    Hands,
    RightHand,
    LeftHand,
    Feet,
    Outer,
    Light,
    Aux,
}

impl EquipSlot {
    /// How the player is using an item in this slot
    pub const fn describe_use(&self) -> &'static str {
        match self {
            EquipSlot::Wield => "wielding",
            EquipSlot::Head => "wearing on your head",
            EquipSlot::Neck => "wearing around your neck",
            EquipSlot::Body => "wearing on your body",
            EquipSlot::Arm => "wearing on your arm",
            EquipSlot::Hands => "wearing on your hands",
            EquipSlot::RightHand => "wearing on your right hand",
            EquipSlot::LeftHand => "wearing on your left hand",
            EquipSlot::Feet => "wearing on your feet",
            EquipSlot::Outer => "wearing about your body",
            EquipSlot::Light => "using to light the way",
            EquipSlot::Aux => "holding ready by your side",
        }
    }
}

/// Use description for items that are merely carried
pub const CARRIED_USE: &str = "carrying in your pack";

/// Carried items plus the equipment list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    carried: Vec<Item>,
    worn: [Option<Item>; EquipSlot::COUNT],
}

impl Pack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the pack; returns it back when the pack is full
    pub fn carry(&mut self, item: Item) -> Result<(), Item> {
        if self.carried.len() >= INVEN_PACK_SLOTS {
            return Err(item);
        }
        self.carried.push(item);
        Ok(())
    }

    /// Put an item in a slot, returning whatever was there
    pub fn equip(&mut self, slot: EquipSlot, item: Item) -> Option<Item> {
        self.worn[slot as usize].replace(item)
    }

    pub fn carried(&self) -> &[Item] {
        &self.carried
    }

    pub fn carried_mut(&mut self) -> &mut [Item] {
        &mut self.carried
    }

    pub fn worn(&self, slot: EquipSlot) -> Option<&Item> {
        self.worn[slot as usize].as_ref()
    }

    pub fn worn_mut(&mut self, slot: EquipSlot) -> Option<&mut Item> {
        self.worn[slot as usize].as_mut()
    }

    /// Every worn item with its slot
    pub fn equipment(&self) -> impl Iterator<Item = (EquipSlot, &Item)> {
        EquipSlot::iter().filter_map(|slot| self.worn(slot).map(|item| (slot, item)))
    }

    /// Remaining turns of light in the light slot
    pub fn light_fuel(&self) -> i32 {
        self.worn(EquipSlot::Light).map_or(0, |item| item.pval)
    }

    /// Index of the first carried item in category `tval`
    pub fn find_category(&self, tval: u8) -> Option<usize> {
        self.carried.iter().position(|item| item.tval == tval)
    }

    /// Take one item off the stack at `index`, removing the stack when empty
    pub fn remove_one(&mut self, index: usize) -> Option<Item> {
        let stack = self.carried.get_mut(index)?;
        if stack.quantity > 1 {
            stack.quantity -= 1;
            let mut single = stack.clone();
            single.quantity = 1;
            Some(single)
        } else {
            Some(self.carried.remove(index))
        }
    }

    /// Union of all worn item flags
    pub fn worn_flags(&self) -> ItemFlags {
        self.equipment()
            .fold(ItemFlags::empty(), |flags, (_, item)| flags | item.flags)
    }

    /// Strip the curse from every worn item; true if anything changed
    pub fn remove_curses(&mut self) -> bool {
        let mut changed = false;
        for item in self.worn.iter_mut().flatten() {
            if item.is_cursed() {
                item.flags.remove(ItemFlags::CURSED);
                changed = true;
            }
        }
        changed
    }
}
