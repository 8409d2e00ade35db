//! Disturbance: breaking the player out of repeats, rests, runs and searches
//!
//! These are the only functions that clear those modes.

use crate::consts::MAX_SHORT;
use crate::gameloop::GameState;
use crate::interface::{Request, StatField};
use crate::player::StatusFlags;

/// Interrupt whatever the player is doing
///
/// Always cancels the repeat count and any rest. `search` also drops search
/// mode; `light` (or an active run) ends the run and rechecks the view.
pub fn disturb(state: &mut GameState, search: bool, light: bool) {
    state.command.count = 0;
    if search && state.player.is_searching() {
        search_off(state);
    }
    if state.player.is_resting() {
        rest_off(state);
    }
    if light || state.command.find {
        state.command.find = false;
        state.request(Request::CheckView);
    }
    state.request(Request::Flush);
}

/// Stop resting
pub fn rest_off(state: &mut GameState) {
    state.player.timers.rest = 0;
    state.player.status.remove(StatusFlags::REST);
    state.print_state();
    state.player.food_digested += 1;
}

/// Why a rest request was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestRefusal {
    /// Zero turns; nothing to say
    Empty,
    /// Out of range
    Invalid,
}

/// Begin resting for `turns` turns, or until healed with `-MAX_SHORT`
pub fn start_rest(state: &mut GameState, turns: i32) -> Result<(), RestRefusal> {
    let valid = turns == -MAX_SHORT || (turns > 0 && turns < MAX_SHORT);
    if !valid {
        return Err(if turns == 0 {
            RestRefusal::Empty
        } else {
            RestRefusal::Invalid
        });
    }

    if state.player.is_searching() {
        search_off(state);
    }
    state.player.timers.rest = turns;
    state.player.status.insert(StatusFlags::REST);
    state.print_state();
    state.player.food_digested -= 1;
    tracing::debug!(turns, "resting");
    Ok(())
}

/// Enter search mode: slower, hungrier, more observant
pub fn search_on(state: &mut GameState) {
    state.change_speed(1);
    state.player.status.insert(StatusFlags::SEARCH);
    state.print_state();
    state.request(Request::Stat(StatField::Speed));
    state.player.food_digested += 1;
}

pub fn search_off(state: &mut GameState) {
    state.request(Request::CheckView);
    state.change_speed(-1);
    state.player.status.remove(StatusFlags::SEARCH);
    state.print_state();
    state.request(Request::Stat(StatField::Speed));
    state.player.food_digested -= 1;
}

/// Stop running
pub fn end_find(state: &mut GameState) {
    if state.command.find {
        state.command.find = false;
        state.request(Request::CheckView);
    }
}
