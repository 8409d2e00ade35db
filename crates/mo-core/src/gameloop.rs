//! Main game loop
//!
//! One call to [`GameLoop::turn`] is one game turn: timed conditions tick
//! in [`TICK_ORDER`], the player acts if able, then monsters move.

use serde::{Deserialize, Serialize};

use crate::action::{CommandState, decode, dispatch};
use crate::consts::{MAX_MALLOC_CHANCE, STORE_TURNAROUND, WIZARD_TELEPORT_RANGE};
use crate::interface::{Host, Request, StatField, deliver};
use crate::player::{PlayerState, StatusFlags};
use crate::rng::GameRng;
use crate::world::timeout::{TickScratch, run_phase};
use crate::world::{
    DungeonContext, GameOptions, MessageLog, Phase, TICK_ORDER, disturb, enchant, end_find,
    search_off,
};

/// Where the loop is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Updating conditions and monsters
    Running,
    /// Reading or executing a player command
    AwaitingCommand,
    /// Between levels
    Transitioning,
    /// Dead, saved or out of input
    Terminated,
}

/// Why a level loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    NewLevel,
    Died,
    Saved,
    EndOfInput,
}

/// Main game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: PlayerState,
    pub dungeon: DungeonContext,
    pub command: CommandState,
    pub options: GameOptions,

    /// Random number generator
    pub rng: GameRng,

    /// Message history
    pub messages: MessageLog,

    /// Side effects waiting for the host
    #[serde(skip)]
    pub requests: Vec<Request>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameRng::from_entropy())
    }
}

impl GameState {
    /// Create a new game with the given RNG
    pub fn new(rng: GameRng) -> Self {
        Self {
            player: PlayerState::default(),
            dungeon: DungeonContext::default(),
            command: CommandState::default(),
            options: GameOptions::default(),
            rng,
            messages: MessageLog::default(),
            requests: Vec::new(),
        }
    }

    /// Create a new game from options, seeding from them when they carry a seed
    pub fn with_options(options: GameOptions) -> Self {
        let rng = options.seed.map_or_else(GameRng::from_entropy, GameRng::new);
        Self {
            messages: MessageLog::with_capacity(options.message_history),
            options,
            ..Self::new(rng)
        }
    }

    /// Add a message to display
    pub fn message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::trace!(%msg, "message");
        self.messages.push(msg.clone());
        self.requests.push(Request::Message(msg));
    }

    pub fn request(&mut self, request: Request) {
        self.requests.push(request);
    }

    /// Apply damage; invulnerability absorbs all of it
    pub fn take_hit(&mut self, damage: i32, from: &str) {
        let damage = if self.player.timers.invulnerable > 0 { 0 } else { damage };
        self.player.hp.cur -= damage;
        if self.player.hp.cur < 0 {
            if !self.dungeon.death {
                self.dungeon.death = true;
                self.dungeon.died_from = from.to_string();
                self.dungeon.total_winner = false;
                tracing::info!(from, turn = self.dungeon.turn, "player died");
            }
            self.dungeon.new_level = true;
        } else {
            self.request(Request::Stat(StatField::CurrentHp));
        }
    }

    /// Adjust speed (negative is faster) and flag it for redraw
    pub fn change_speed(&mut self, amount: i32) {
        self.player.speed += amount;
        self.player.status.insert(StatusFlags::SPEED);
    }

    /// Refresh the state line: paralysed, resting, repeat count or searching
    pub fn print_state(&mut self) {
        let status = &mut self.player.status;
        status.remove(StatusFlags::REPEAT);
        if self.player.timers.paralysis <= 1
            && !status.contains(StatusFlags::REST)
            && self.command.count > 0
        {
            status.insert(StatusFlags::REPEAT);
        }
        self.request(Request::Stat(StatField::State));
    }
}

/// Game loop controller
pub struct GameLoop<H: Host> {
    state: GameState,
    host: H,
    phase: TurnPhase,
}

impl<H: Host> GameLoop<H> {
    /// Create a new game loop with the given state
    pub fn new(state: GameState, host: H) -> Self {
        Self {
            state,
            host,
            phase: TurnPhase::Transitioning,
        }
    }

    /// Get reference to game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Get mutable reference to game state
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Consume the game loop and return the owned game state
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Play level after level until the character dies, is saved or input
    /// runs out
    pub fn play(&mut self) -> LoopOutcome {
        loop {
            self.phase = TurnPhase::Transitioning;
            self.host.generate_level(&mut self.state);
            let outcome = self.run_level();
            if outcome != LoopOutcome::NewLevel {
                return outcome;
            }
        }
    }

    /// Run turns on the current level until it is left
    pub fn run_level(&mut self) -> LoopOutcome {
        self.enter_level();
        while !self.state.dungeon.level_over() {
            self.turn();
        }
        let outcome = self.outcome();
        tracing::debug!(?outcome, depth = self.state.dungeon.depth, "level loop ended");
        outcome
    }

    fn outcome(&self) -> LoopOutcome {
        let dungeon = &self.state.dungeon;
        if dungeon.death {
            LoopOutcome::Died
        } else if dungeon.saved {
            LoopOutcome::Saved
        } else if dungeon.eof {
            LoopOutcome::EndOfInput
        } else {
            LoopOutcome::NewLevel
        }
    }

    /// Set up the loop for a freshly generated level
    pub fn enter_level(&mut self) {
        let Self { state, host, phase } = self;
        *phase = TurnPhase::Transitioning;

        state.player.light_on = state.player.pack.light_fuel() > 0;
        state.dungeon.note_depth();

        state.command.count = 0;
        state.command.find = false;
        state.command.find_count = 0;
        state.dungeon.new_level = false;
        state.dungeon.teleport_requested = false;

        state.request(Request::CheckView);
        if state.player.is_searching() {
            search_off(state);
        }
        state.request(Request::UpdateMonsters);
        state.request(Request::Stat(StatField::Depth));
        deliver(state, host);

        tracing::debug!(depth = state.dungeon.depth, max_depth = state.dungeon.max_depth, "entered level");
        *phase = TurnPhase::Running;
    }

    /// Advance the game by one turn
    pub fn turn(&mut self) {
        let Self { state, host, phase } = self;
        *phase = TurnPhase::Running;

        state.dungeon.turn += 1;
        let turn = state.dungeon.turn;
        tracing::trace!(turn, "turn");

        if state.dungeon.depth != 0 && turn % STORE_TURNAROUND == 0 {
            host.restock_stores(state);
        }
        if state.rng.one_in(MAX_MALLOC_CHANCE) {
            host.spawn_monster(state);
        }

        let mut scratch = TickScratch::default();
        for &step in TICK_ORDER {
            if step == Phase::InterruptCheck {
                check_interrupt(state, host);
            } else {
                run_phase(state, step, &mut scratch);
            }
        }

        if state.player.status.contains(StatusFlags::STR_WGT) {
            state.player.status.remove(StatusFlags::STR_WGT);
            host.check_strength(state);
        }
        if state.player.status.contains(StatusFlags::STUDY) {
            state.request(Request::Stat(StatField::Study));
        }
        flush_status(state);

        if enchant::scan_due(state) {
            enchant::sense_enchantments(state);
        }

        if host.monster_list_nearly_full(state) {
            host.compact_monsters(state);
        }
        deliver(state, host);

        let timers = &state.player.timers;
        if timers.paralysis < 1 && timers.rest == 0 && !state.dungeon.death {
            *phase = TurnPhase::AwaitingCommand;
            player_turn(state, host);
            *phase = TurnPhase::Running;
        } else {
            state.request(Request::Flush);
        }

        if state.dungeon.teleport_requested {
            state.dungeon.teleport_requested = false;
            host.teleport_player(state, WIZARD_TELEPORT_RANGE);
        }
        if !state.dungeon.new_level {
            host.advance_monsters(state, true);
        }
        deliver(state, host);

        if state.dungeon.level_over() {
            *phase = if state.dungeon.new_level && !state.dungeon.death {
                TurnPhase::Transitioning
            } else {
                TurnPhase::Terminated
            };
        }
    }
}

/// Any key stops a repeat, run or rest
fn check_interrupt<H: Host + ?Sized>(state: &mut GameState, host: &mut H) {
    let busy = state.command.count > 0 || state.command.find || state.player.timers.rest != 0;
    if !busy {
        return;
    }
    let micros = if state.command.find {
        0
    } else {
        state.options.interrupt_poll_micros
    };
    deliver(state, host);
    if host.poll_input(micros) {
        tracing::debug!("interrupted by keypress");
        disturb(state, false, false);
    }
}

/// Redraw status fields whose dirty bits are set
fn flush_status(state: &mut GameState) {
    let status = state.player.status;
    let paralysis = state.player.timers.paralysis;

    if status.contains(StatusFlags::SPEED) {
        state.player.status.remove(StatusFlags::SPEED);
        state.request(Request::Stat(StatField::Speed));
    }

    if status.contains(StatusFlags::PARALYSED) && paralysis < 1 {
        state.print_state();
        state.player.status.remove(StatusFlags::PARALYSED);
    } else if paralysis > 0 {
        state.print_state();
        state.player.status.insert(StatusFlags::PARALYSED);
    } else if state.player.timers.rest != 0 {
        state.print_state();
    }

    for (flag, fields) in [
        (StatusFlags::ARMOR, &[StatField::ArmorClass][..]),
        (StatusFlags::STATS, &[StatField::Stats][..]),
        (StatusFlags::HP, &[StatField::MaxHp, StatField::CurrentHp][..]),
        (StatusFlags::MANA, &[StatField::Mana][..]),
    ] {
        if status.contains(flag) {
            state.player.status.remove(flag);
            for &field in fields {
                state.request(Request::Stat(field));
            }
        }
    }
}

/// Read and run commands until one takes game time
///
/// A run in progress takes its next step instead of reading a key.
fn player_turn<H: Host + ?Sized>(state: &mut GameState, host: &mut H) {
    loop {
        if state.player.status.contains(StatusFlags::REPEAT) {
            state.print_state();
        }
        state.command.default_dir = false;
        state.command.free_turn = false;

        if state.command.find {
            if !host.run_step(state) {
                end_find(state);
            }
            state.command.find_count -= 1;
            if state.command.find_count == 0 {
                end_find(state);
            }
            state.request(Request::Flush);
        } else {
            let command = decode(state, host);
            dispatch(state, host, command);

            // A run counts its steps separately from the repeat count
            let cmd = &mut state.command;
            if cmd.find {
                cmd.find_count = cmd.count - 1;
                cmd.count = 0;
            } else if cmd.free_turn {
                cmd.count = 0;
            } else if cmd.count > 0 {
                cmd.count -= 1;
            }
        }
        deliver(state, host);

        if !state.command.free_turn || state.dungeon.level_over() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionResult, Command, Direction};
    use crate::interface::{Key, Keyboard, Persistence, Screen, World};
    use crate::player::Pool;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Recorder {
        keys: VecDeque<Key>,
        polls: usize,
        restocks: usize,
        moves: usize,
        teleports: Vec<u32>,
        stats: Vec<StatField>,
    }

    impl Screen for Recorder {
        fn print_message(&mut self, _text: &str) {}
        fn print_line(&mut self, _text: &str) {}
        fn print_stat(&mut self, field: StatField, _state: &GameState) {
            self.stats.push(field);
        }
    }

    impl Keyboard for Recorder {
        fn read_key(&mut self) -> Option<Key> {
            self.keys.pop_front()
        }
        fn poll_input(&mut self, _timeout_micros: u64) -> bool {
            self.polls += 1;
            false
        }
    }

    impl World for Recorder {
        fn restock_stores(&mut self, _state: &mut GameState) {
            self.restocks += 1;
        }
        fn teleport_player(&mut self, _state: &mut GameState, range: u32) {
            self.teleports.push(range);
        }
        fn move_player(&mut self, _: &mut GameState, _: Direction, _: bool) -> ActionResult {
            self.moves += 1;
            ActionResult::Success
        }
    }

    impl Persistence for Recorder {
        fn save_character(&mut self, _state: &GameState) -> bool {
            true
        }
    }

    fn game(keys: &str) -> GameLoop<Recorder> {
        let mut state = GameState::new(GameRng::new(8));
        state.options.rogue_like_commands = true;
        let host = Recorder {
            keys: keys.bytes().map(Key).collect(),
            ..Recorder::default()
        };
        GameLoop::new(state, host)
    }

    #[test]
    fn test_turn_advances_counter() {
        let mut game = game("ll");
        game.turn();
        game.turn();
        assert_eq!(game.state().dungeon.turn, 2);
        assert_eq!(game.host().moves, 2);
        assert_eq!(game.phase(), TurnPhase::Running);
    }

    #[test]
    fn test_stores_restock_only_below_town() {
        let mut game = game("..");
        game.state_mut().dungeon.turn = 999;
        game.turn();
        assert_eq!(game.host().restocks, 0);

        game.state_mut().dungeon.turn = 1999;
        game.state_mut().dungeon.depth = 2;
        game.turn();
        assert_eq!(game.host().restocks, 1);
    }

    #[test]
    fn test_paralysed_player_reads_no_keys() {
        let mut game = game("l");
        game.state_mut().player.timers.paralysis = 3;
        game.turn();
        assert_eq!(game.host().keys.len(), 1);
        assert_eq!(game.state().player.timers.paralysis, 2);
        assert!(game.state().player.status.contains(StatusFlags::PARALYSED));
    }

    #[test]
    fn test_free_commands_loop_within_one_turn() {
        let mut game = game("ix l");
        game.turn();
        assert_eq!(game.state().dungeon.turn, 1);
        assert_eq!(game.host().moves, 1);
        assert!(game.host().keys.is_empty());
    }

    #[test]
    fn test_poll_only_while_busy() {
        let mut game = game("l3l");
        game.turn();
        assert_eq!(game.host().polls, 0);
        game.turn();
        game.turn();
        assert_eq!(game.host().polls, 1);
    }

    #[test]
    fn test_counted_run_steps() {
        let mut game = game("3L");
        game.turn();
        assert!(game.state().command.find);
        assert_eq!(game.state().command.find_count, 2);
        assert_eq!(game.state().command.count, 0);
    }

    #[test]
    fn test_resting_player_skips_commands() {
        let mut game = game("l");
        game.state_mut().player.timers.rest = 5;
        game.turn();
        assert_eq!(game.host().moves, 0);
        assert_eq!(game.state().player.timers.rest, 4);
    }

    #[test]
    fn test_enter_level_resets_loop_flags() {
        let mut game = game("");
        {
            let state = game.state_mut();
            state.dungeon.depth = 6;
            state.dungeon.new_level = true;
            state.command.count = 9;
            state.command.find = true;
            state.player.status.insert(StatusFlags::SEARCH);
            state.player.pack.equip(
                crate::object::EquipSlot::Light,
                crate::object::Item::light(0, 50),
            );
        }
        game.enter_level();
        let state = game.state();
        assert!(!state.dungeon.new_level);
        assert_eq!(state.command.count, 0);
        assert!(!state.command.find);
        assert!(!state.player.is_searching());
        assert!(state.player.light_on);
        assert_eq!(state.dungeon.max_depth, 6);
        assert!(game.host().stats.contains(&StatField::Depth));
    }

    #[test]
    fn test_teleport_request_resolved() {
        let mut game = game(".");
        game.state_mut().dungeon.teleport_requested = true;
        game.turn();
        assert_eq!(game.host().teleports, vec![100]);
        assert!(!game.state().dungeon.teleport_requested);
    }

    #[test]
    fn test_end_of_input_terminates() {
        let mut game = game("");
        let outcome = game.run_level();
        assert_eq!(outcome, LoopOutcome::EndOfInput);
        assert_eq!(game.phase(), TurnPhase::Terminated);
    }

    #[test]
    fn test_stairs_end_level() {
        let mut game = game(">");
        let outcome = game.run_level();
        // No staircase here, so the level only ends when input runs out
        assert_eq!(outcome, LoopOutcome::EndOfInput);
        assert_eq!(
            game.state().messages.last(),
            Some("I see no down staircase here.")
        );
    }

    #[test]
    fn test_take_hit() {
        let mut state = GameState::new(GameRng::new(1));
        state.player.hp = Pool::new(5);
        state.player.timers.invulnerable = 2;
        state.take_hit(50, "a dragon");
        assert_eq!(state.player.hp.cur, 5);

        state.player.timers.invulnerable = 0;
        state.take_hit(6, "a kobold");
        assert!(state.dungeon.death);
        assert!(state.dungeon.new_level);
        assert_eq!(state.dungeon.died_from, "a kobold");

        state.take_hit(6, "a rat");
        assert_eq!(state.dungeon.died_from, "a kobold");
    }

    #[test]
    fn test_print_state_repeat_flag() {
        let mut state = GameState::new(GameRng::new(1));
        state.command.count = 4;
        state.print_state();
        assert!(state.player.status.contains(StatusFlags::REPEAT));
        state.command.count = 0;
        state.print_state();
        assert!(!state.player.status.contains(StatusFlags::REPEAT));
    }

    #[test]
    fn test_with_options_uses_seed() {
        let options = GameOptions {
            seed: Some(77),
            message_history: 5,
            ..GameOptions::default()
        };
        let state = GameState::with_options(options);
        assert_eq!(state.rng.seed(), 77);
        assert_eq!(state.messages.capacity(), 5);
    }

    #[test]
    fn test_state_survives_serde() {
        let mut state = GameState::new(GameRng::new(3));
        state.command.last = Some(Command::Run(Direction::North));
        state.message("hello");
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.command.last, state.command.last);
        assert_eq!(restored.messages.last(), Some("hello"));
        assert!(restored.requests.is_empty());
    }
}
