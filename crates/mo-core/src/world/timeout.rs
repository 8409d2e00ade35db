//! Timed player conditions
//!
//! Every countdown condition is a [`TimedEffect`] record in [`EFFECTS`]:
//! which counter it owns plus optional activation, per-tick and expiry
//! hooks. One generic [`TimedEffect::tick`] drives all of them. Conditions
//! that do not fit the countdown shape (light, food, resting, word of
//! recall, random teleport) are custom [`Phase`]s. [`TICK_ORDER`] fixes
//! the order everything runs in each turn.

use super::disturb::{disturb, end_find, rest_off};
use super::regen;
use crate::consts::{LIGHT_FAINT_THRESHOLD, RANDOM_TELEPORT_RANGE};
use crate::gameloop::GameState;
use crate::interface::{Request, StatField};
use crate::object::EquipSlot;
use crate::player::Condition;

/// What the gate decided before a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Tick normally
    Proceed,
    /// Cancel the condition before it starts
    Suppress,
    /// Drop the counter to 1 so this tick ends the condition
    ExpireNow,
}

/// Edge crossed by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Exited,
    EnteredAndExited,
}

impl Transition {
    fn from_edges(entered: bool, exited: bool) -> Option<Self> {
        match (entered, exited) {
            (true, true) => Some(Transition::EnteredAndExited),
            (true, false) => Some(Transition::Entered),
            (false, true) => Some(Transition::Exited),
            (false, false) => None,
        }
    }
}

pub type Hook = fn(&mut GameState);
/// Runs after every decrement with the remaining count
pub type TickHook = fn(&mut GameState, i32);
/// Receives whether the activation has already run
pub type GateHook = fn(&GameState, bool) -> Gate;

/// A countdown condition described as data
pub struct TimedEffect {
    pub condition: Condition,
    pub gate: Option<GateHook>,
    pub enter: Option<Hook>,
    pub each: Option<TickHook>,
    pub exit: Option<Hook>,
}

impl TimedEffect {
    const fn plain(condition: Condition) -> Self {
        Self {
            condition,
            gate: None,
            enter: None,
            each: None,
            exit: None,
        }
    }

    /// Advance the condition by one turn
    ///
    /// Counter at or below zero: nothing. Otherwise run the activation if it
    /// has not run yet, decrement, and run the expiry on reaching zero.
    pub fn tick(&self, state: &mut GameState) -> Option<Transition> {
        if state.player.timers.get(self.condition) <= 0 {
            return None;
        }

        let flag = self.condition.flag();
        let active = state.player.conditions.contains(flag);
        match self.gate.map_or(Gate::Proceed, |gate| gate(state, active)) {
            Gate::Proceed => {}
            Gate::Suppress => {
                *state.player.timers.get_mut(self.condition) = 0;
                return None;
            }
            Gate::ExpireNow => {
                *state.player.timers.get_mut(self.condition) = 1;
            }
        }

        let entered = !active;
        if entered {
            state.player.conditions.insert(flag);
            if let Some(enter) = self.enter {
                enter(state);
            }
        }

        let remaining = {
            let counter = state.player.timers.get_mut(self.condition);
            *counter -= 1;
            *counter
        };
        if let Some(each) = self.each {
            each(state, remaining);
        }

        let exited = remaining == 0;
        if exited {
            state.player.conditions.remove(flag);
            if let Some(exit) = self.exit {
                exit(state);
            }
        }

        let transition = Transition::from_edges(entered, exited);
        if let Some(transition) = transition {
            tracing::debug!(condition = %self.condition, ?transition, "condition transition");
        }
        transition
    }
}

/// Registry of countdown conditions, indexed by `Condition as usize`
pub static EFFECTS: [TimedEffect; 17] = [
    TimedEffect {
        enter: Some(hero_enter),
        exit: Some(hero_exit),
        ..TimedEffect::plain(Condition::Hero)
    },
    TimedEffect {
        enter: Some(super_hero_enter),
        exit: Some(super_hero_exit),
        ..TimedEffect::plain(Condition::SuperHero)
    },
    TimedEffect {
        enter: Some(blind_enter),
        exit: Some(blind_exit),
        ..TimedEffect::plain(Condition::Blind)
    },
    TimedEffect {
        enter: Some(confused_enter),
        exit: Some(confused_exit),
        ..TimedEffect::plain(Condition::Confused)
    },
    TimedEffect {
        gate: Some(fear_gate),
        enter: Some(afraid_enter),
        exit: Some(afraid_exit),
        ..TimedEffect::plain(Condition::Afraid)
    },
    TimedEffect {
        enter: Some(poison_enter),
        each: Some(poison_each),
        exit: Some(poison_exit),
        ..TimedEffect::plain(Condition::Poisoned)
    },
    TimedEffect {
        enter: Some(fast_enter),
        exit: Some(fast_exit),
        ..TimedEffect::plain(Condition::Fast)
    },
    TimedEffect {
        enter: Some(slow_enter),
        exit: Some(slow_exit),
        ..TimedEffect::plain(Condition::Slow)
    },
    TimedEffect {
        each: Some(hallucination_each),
        exit: Some(hallucination_exit),
        ..TimedEffect::plain(Condition::Hallucinating)
    },
    TimedEffect {
        each: Some(paralysis_each),
        ..TimedEffect::plain(Condition::Paralysed)
    },
    TimedEffect {
        exit: Some(protect_evil_exit),
        ..TimedEffect::plain(Condition::ProtectedFromEvil)
    },
    TimedEffect {
        enter: Some(invulnerable_enter),
        exit: Some(invulnerable_exit),
        ..TimedEffect::plain(Condition::Invulnerable)
    },
    TimedEffect {
        enter: Some(blessed_enter),
        exit: Some(blessed_exit),
        ..TimedEffect::plain(Condition::Blessed)
    },
    TimedEffect {
        exit: Some(resist_heat_exit),
        ..TimedEffect::plain(Condition::ResistHeat)
    },
    TimedEffect {
        exit: Some(resist_cold_exit),
        ..TimedEffect::plain(Condition::ResistCold)
    },
    TimedEffect {
        enter: Some(detect_invisible_enter),
        exit: Some(detect_invisible_exit),
        ..TimedEffect::plain(Condition::DetectInvisible)
    },
    TimedEffect {
        enter: Some(infravision_enter),
        exit: Some(infravision_exit),
        ..TimedEffect::plain(Condition::Infravision)
    },
];

/// Registry entry for a condition
pub fn effect(condition: Condition) -> &'static TimedEffect {
    &EFFECTS[condition as usize]
}

/// One step of the per-turn update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Light,
    Timed(Condition),
    Food,
    Regeneration,
    Resting,
    /// Poll for a key that interrupts repeats, runs and rests
    InterruptCheck,
    WordOfRecall,
    RandomTeleport,
}

/// Order of the per-turn update
///
/// Heroism precedes anything that can damage the player.
pub const TICK_ORDER: &[Phase] = &[
    Phase::Light,
    Phase::Timed(Condition::Hero),
    Phase::Timed(Condition::SuperHero),
    Phase::Food,
    Phase::Regeneration,
    Phase::Timed(Condition::Blind),
    Phase::Timed(Condition::Confused),
    Phase::Timed(Condition::Afraid),
    Phase::Timed(Condition::Poisoned),
    Phase::Timed(Condition::Fast),
    Phase::Timed(Condition::Slow),
    Phase::Resting,
    Phase::InterruptCheck,
    Phase::Timed(Condition::Hallucinating),
    Phase::Timed(Condition::Paralysed),
    Phase::Timed(Condition::ProtectedFromEvil),
    Phase::Timed(Condition::Invulnerable),
    Phase::Timed(Condition::Blessed),
    Phase::Timed(Condition::ResistHeat),
    Phase::Timed(Condition::ResistCold),
    Phase::Timed(Condition::DetectInvisible),
    Phase::Timed(Condition::Infravision),
    Phase::WordOfRecall,
    Phase::RandomTeleport,
];

/// Values handed from one phase to a later one within a turn
#[derive(Debug, Clone, Copy, Default)]
pub struct TickScratch {
    pub regen_amount: i32,
}

/// Run one phase of the update
///
/// [`Phase::InterruptCheck`] needs the keyboard and is left to the clock.
pub fn run_phase(state: &mut GameState, phase: Phase, scratch: &mut TickScratch) -> Option<Transition> {
    match phase {
        Phase::Light => update_light(state),
        Phase::Timed(condition) => effect(condition).tick(state),
        Phase::Food => {
            scratch.regen_amount = regen::consume_food(state);
            None
        }
        Phase::Regeneration => {
            regen::regenerate(state, scratch.regen_amount);
            None
        }
        Phase::Resting => update_rest(state),
        Phase::InterruptCheck => None,
        Phase::WordOfRecall => update_word_of_recall(state),
        Phase::RandomTeleport => {
            if state.player.random_teleport && state.rng.one_in(100) {
                disturb(state, false, false);
                state.request(Request::Teleport(RANDOM_TELEPORT_RANGE));
            }
            None
        }
    }
}

/// Run every phase in order, skipping the interrupt check
pub fn tick_all(state: &mut GameState) {
    let mut scratch = TickScratch::default();
    for &phase in TICK_ORDER {
        run_phase(state, phase, &mut scratch);
    }
}

fn update_light(state: &mut GameState) -> Option<Transition> {
    let blind = state.player.timers.blind;
    let lit = state.player.light_on;
    let fuel = match state.player.pack.worn_mut(EquipSlot::Light) {
        Some(light) if light.pval > 0 => {
            light.pval -= 1;
            Some(light.pval)
        }
        _ => None,
    };

    match (lit, fuel) {
        (true, Some(0)) | (true, None) => {
            state.player.light_on = false;
            if fuel.is_some() {
                state.message("Your light has gone out!");
            }
            disturb(state, false, true);
            state.request(Request::UpdateMonsters);
            Some(Transition::Exited)
        }
        (true, Some(left)) => {
            if left < LIGHT_FAINT_THRESHOLD && state.rng.one_in(5) && blind < 1 {
                disturb(state, false, false);
                state.message("Your light is growing faint.");
            }
            None
        }
        (false, Some(_)) => {
            state.player.light_on = true;
            disturb(state, false, true);
            state.request(Request::UpdateMonsters);
            Some(Transition::Entered)
        }
        (false, None) => None,
    }
}

fn update_rest(state: &mut GameState) -> Option<Transition> {
    let rest = &mut state.player.timers.rest;
    let done = if *rest > 0 {
        *rest -= 1;
        *rest == 0
    } else if *rest < 0 {
        *rest += 1;
        let healed = state.player.hp.is_full() && state.player.mana.is_full();
        healed || state.player.timers.rest == 0
    } else {
        false
    };

    if done {
        rest_off(state);
        Some(Transition::Exited)
    } else {
        None
    }
}

fn update_word_of_recall(state: &mut GameState) -> Option<Transition> {
    let recall = state.player.timers.word_of_recall;
    if recall <= 0 {
        return None;
    }
    if recall > 1 {
        state.player.timers.word_of_recall -= 1;
        return None;
    }

    state.dungeon.new_level = true;
    state.player.timers.paralysis += 1;
    state.player.timers.word_of_recall = 0;
    if state.dungeon.depth > 0 {
        state.dungeon.depth = 0;
        state.message("You feel yourself yanked upwards!");
    } else if state.dungeon.max_depth != 0 {
        state.dungeon.depth = state.dungeon.max_depth;
        state.message("You feel yourself yanked downwards!");
    }
    tracing::debug!(depth = state.dungeon.depth, "word of recall");
    Some(Transition::Exited)
}

fn heroism_on(state: &mut GameState, hp: i32, to_hit: i32) {
    disturb(state, false, false);
    let player = &mut state.player;
    player.hp.max += hp;
    player.hp.cur += hp;
    player.bth += to_hit;
    player.bthb += to_hit;
}

fn heroism_off(state: &mut GameState, hp: i32, to_hit: i32) {
    disturb(state, false, false);
    let player = &mut state.player;
    let clamped = player.hp.lower_max(hp);
    player.bth -= to_hit;
    player.bthb -= to_hit;
    if clamped {
        state.request(Request::Stat(StatField::CurrentHp));
    }
}

fn hero_enter(state: &mut GameState) {
    heroism_on(state, 10, 12);
    state.message("You feel like a HERO!");
    state.request(Request::Stat(StatField::MaxHp));
    state.request(Request::Stat(StatField::CurrentHp));
}

fn hero_exit(state: &mut GameState) {
    heroism_off(state, 10, 12);
    state.message("The heroism wears off.");
    state.request(Request::Stat(StatField::MaxHp));
}

fn super_hero_enter(state: &mut GameState) {
    heroism_on(state, 20, 24);
    state.message("You feel like a SUPER HERO!");
    state.request(Request::Stat(StatField::MaxHp));
    state.request(Request::Stat(StatField::CurrentHp));
}

fn super_hero_exit(state: &mut GameState) {
    heroism_off(state, 20, 24);
    state.message("The super heroism wears off.");
    state.request(Request::Stat(StatField::MaxHp));
}

fn blind_enter(state: &mut GameState) {
    state.request(Request::RefreshMap);
    state.request(Request::Stat(StatField::Blind));
    disturb(state, false, true);
    state.request(Request::UpdateMonsters);
}

fn blind_exit(state: &mut GameState) {
    state.request(Request::Stat(StatField::Blind));
    state.request(Request::RefreshMap);
    disturb(state, false, true);
    state.request(Request::UpdateMonsters);
    state.message("The veil of darkness lifts.");
}

fn confused_enter(state: &mut GameState) {
    state.request(Request::Stat(StatField::Confused));
}

fn confused_exit(state: &mut GameState) {
    state.request(Request::Stat(StatField::Confused));
    state.message("You feel less confused now.");
    if state.player.is_resting() {
        rest_off(state);
    }
}

/// Heroes shrug off fear before it takes hold, and shake it off after
fn fear_gate(state: &GameState, active: bool) -> Gate {
    if !state.player.is_heroic() {
        Gate::Proceed
    } else if active {
        Gate::ExpireNow
    } else {
        Gate::Suppress
    }
}

fn afraid_enter(state: &mut GameState) {
    state.request(Request::Stat(StatField::Afraid));
}

fn afraid_exit(state: &mut GameState) {
    state.request(Request::Stat(StatField::Afraid));
    state.message("You feel bolder now.");
    disturb(state, false, false);
}

fn poison_enter(state: &mut GameState) {
    state.request(Request::Stat(StatField::Poisoned));
}

/// Poison damage by constitution; hardy characters only take damage on
/// some turns
fn poison_each(state: &mut GameState, remaining: i32) {
    if remaining == 0 {
        return;
    }
    let turn = state.dungeon.turn;
    let damage = match state.player.con_adj() {
        i32::MIN..=-4 => 4,
        -3 | -2 => 3,
        -1 => 2,
        0 => 1,
        1..=3 => i32::from(turn % 2 == 0),
        4 | 5 => i32::from(turn % 3 == 0),
        6 => i32::from(turn % 4 == 0),
        _ => 0,
    };
    state.take_hit(damage, "poison");
    disturb(state, true, false);
}

fn poison_exit(state: &mut GameState) {
    state.request(Request::Stat(StatField::Poisoned));
    state.message("You feel better.");
    disturb(state, false, false);
}

fn fast_enter(state: &mut GameState) {
    state.change_speed(-1);
    state.message("You feel yourself moving faster.");
    disturb(state, false, false);
}

fn fast_exit(state: &mut GameState) {
    state.change_speed(1);
    state.message("You feel yourself slow down.");
    disturb(state, false, false);
}

fn slow_enter(state: &mut GameState) {
    state.change_speed(1);
    state.message("You feel yourself moving slower.");
    disturb(state, false, false);
}

fn slow_exit(state: &mut GameState) {
    state.change_speed(-1);
    state.message("You feel yourself speed up.");
    disturb(state, false, false);
}

fn hallucination_each(state: &mut GameState, _remaining: i32) {
    end_find(state);
}

fn hallucination_exit(state: &mut GameState) {
    state.request(Request::RefreshMap);
}

fn paralysis_each(state: &mut GameState, _remaining: i32) {
    disturb(state, true, false);
}

fn protect_evil_exit(state: &mut GameState) {
    state.message("You no longer feel safe from evil.");
}

fn invulnerable_enter(state: &mut GameState) {
    disturb(state, false, false);
    state.player.pac += 100;
    state.player.dis_ac += 100;
    state.request(Request::Stat(StatField::ArmorClass));
    state.message("Your skin turns into steel!");
}

fn invulnerable_exit(state: &mut GameState) {
    disturb(state, false, false);
    state.player.pac -= 100;
    state.player.dis_ac -= 100;
    state.request(Request::Stat(StatField::ArmorClass));
    state.message("Your skin returns to normal.");
}

fn blessed_enter(state: &mut GameState) {
    disturb(state, false, false);
    let player = &mut state.player;
    player.bth += 5;
    player.bthb += 5;
    player.pac += 2;
    player.dis_ac += 2;
    state.message("You feel righteous!");
    state.request(Request::Stat(StatField::ArmorClass));
}

fn blessed_exit(state: &mut GameState) {
    disturb(state, false, false);
    let player = &mut state.player;
    player.bth -= 5;
    player.bthb -= 5;
    player.pac -= 2;
    player.dis_ac -= 2;
    state.message("The prayer has expired.");
    state.request(Request::Stat(StatField::ArmorClass));
}

fn resist_heat_exit(state: &mut GameState) {
    state.message("You no longer feel safe from flame.");
}

fn resist_cold_exit(state: &mut GameState) {
    state.message("You no longer feel safe from cold.");
}

fn detect_invisible_enter(state: &mut GameState) {
    state.player.see_invisible = true;
    state.request(Request::UpdateMonsters);
}

fn detect_invisible_exit(state: &mut GameState) {
    // Worn items may still grant it
    state.player.see_invisible = state.player.base_see_invisible();
    state.request(Request::UpdateMonsters);
}

fn infravision_enter(state: &mut GameState) {
    state.player.see_infra += 1;
    state.request(Request::UpdateMonsters);
}

fn infravision_exit(state: &mut GameState) {
    state.player.see_infra -= 1;
    state.request(Request::UpdateMonsters);
}
