//! Food consumption and hit point / mana regeneration

use super::disturb::disturb;
use crate::consts::{PLAYER_FOOD_ALERT, PLAYER_FOOD_FAINT, PLAYER_REGEN_HPBASE, PLAYER_REGEN_MNBASE};
use crate::gameloop::GameState;
use crate::interface::{Request, StatField};
use crate::player::StatusFlags;

/// Burn a turn's food and return the regeneration rate it allows
///
/// Hungry and weak messages fire only on the edge into each tier; eating
/// back above a tier re-arms its message.
pub fn consume_food(state: &mut GameState) -> i32 {
    let hunger = state.player.hunger();
    let regen_amount = hunger.regen_rate();

    if hunger.is_weak() {
        if !state.player.status.contains(StatusFlags::WEAK) {
            state.player.status.insert(StatusFlags::WEAK);
            state.message("You are getting weak from hunger.");
            disturb(state, false, false);
            state.request(Request::Stat(StatField::Hunger));
        }

        if state.player.food < PLAYER_FOOD_FAINT && state.rng.one_in(8) {
            let turns = state.rng.randint(5) as i32;
            state.player.timers.paralysis += turns;
            state.message("You faint from the lack of food.");
            disturb(state, true, false);
        }
    } else if state.player.food < PLAYER_FOOD_ALERT {
        if !state.player.status.contains(StatusFlags::HUNGRY) {
            state.player.status.insert(StatusFlags::HUNGRY);
            state.message("You are getting hungry.");
            disturb(state, false, false);
            state.request(Request::Stat(StatField::Hunger));
        }
    }
    rearm_hunger_messages(state);

    // Sped up characters really burn up the food
    let speed = state.player.speed;
    if speed < 0 {
        state.player.food -= speed * speed;
    }
    state.player.food -= state.player.food_digested;

    if state.player.food < 0 {
        state.take_hit(-state.player.food / 16, "starvation");
        disturb(state, true, false);
    }

    regen_amount
}

fn rearm_hunger_messages(state: &mut GameState) {
    let hunger = state.player.hunger();
    let mut cleared = false;
    if !hunger.is_weak() && state.player.status.contains(StatusFlags::WEAK) {
        state.player.status.remove(StatusFlags::WEAK);
        cleared = true;
    }
    if state.player.food >= PLAYER_FOOD_ALERT && state.player.status.contains(StatusFlags::HUNGRY) {
        state.player.status.remove(StatusFlags::HUNGRY);
        cleared = true;
    }
    if cleared {
        state.request(Request::Stat(StatField::Hunger));
    }
}

/// Regenerate hit points and mana for one turn
pub fn regenerate(state: &mut GameState, amount: i32) {
    let mut amount = amount;
    if state.player.regenerate {
        amount = amount * 3 / 2;
    }
    if state.player.is_searching() || state.player.is_resting() {
        amount *= 2;
    }

    let player = &mut state.player;
    let hp_changed = player.timers.poisoned < 1
        && !player.hp.is_full()
        && player.hp.regenerate(amount, PLAYER_REGEN_HPBASE);
    let mana_changed =
        !player.mana.is_full() && player.mana.regenerate(amount, PLAYER_REGEN_MNBASE);

    if hp_changed {
        state.request(Request::Stat(StatField::CurrentHp));
    }
    if mana_changed {
        state.request(Request::Stat(StatField::Mana));
    }
}
