//! Object system
//!
//! Just enough of an item model for the turn engine: light fuel, oil
//! flasks and the enchantment hints players get from worn gear.

mod item;
mod pack;

pub use item::{Ident, Item, ItemFlags};
pub use pack::{CARRIED_USE, EquipSlot, Pack};
