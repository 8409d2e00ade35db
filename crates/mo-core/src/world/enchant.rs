//! Sensing enchantments on carried and worn items

use super::disturb::disturb;
use crate::consts::{ENCHANT_CHANCE_PACK, ENCHANT_CHANCE_WORN, ENCHANT_SCAN_MASK};
use crate::gameloop::GameState;
use crate::object::{CARRIED_USE, EquipSlot, Ident};
use strum::IntoEnumIterator;

/// Whether this turn gets an enchantment scan at all
pub fn scan_due(state: &mut GameState) -> bool {
    if state.dungeon.turn & ENCHANT_SCAN_MASK != 0 || state.player.timers.confused > 0 {
        return false;
    }
    let odds = 10 + 750 / (5 + state.player.level);
    state.rng.one_in(odds)
}

/// Give each item a chance to reveal a hidden enchantment
///
/// Worn items are noticed more readily than carried ones. Returns how many
/// items were sensed.
pub fn sense_enchantments(state: &mut GameState) -> usize {
    let mut sensed = 0;

    for index in 0..state.player.pack.carried().len() {
        if !state.rng.one_in(ENCHANT_CHANCE_PACK) {
            continue;
        }
        let item = &mut state.player.pack.carried_mut()[index];
        if item.has_hidden_enchantment() {
            item.ident.insert(Ident::MAGIK);
            announce(state, CARRIED_USE);
            sensed += 1;
        }
    }

    for slot in EquipSlot::iter() {
        if state.player.pack.worn(slot).is_none() || !state.rng.one_in(ENCHANT_CHANCE_WORN) {
            continue;
        }
        if let Some(item) = state.player.pack.worn_mut(slot) {
            if item.has_hidden_enchantment() {
                item.ident.insert(Ident::MAGIK);
                announce(state, slot.describe_use());
                sensed += 1;
            }
        }
    }

    sensed
}

fn announce(state: &mut GameState, usage: &str) {
    disturb(state, false, false);
    state.message(format!("There's something about what you are {usage}..."));
    tracing::debug!(usage, "sensed enchantment");
}
