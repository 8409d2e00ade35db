use std::collections::VecDeque;

use mo_core::action::{ActionResult, Direction};
use mo_core::interface::{Key, Keyboard, Persistence, Screen, StatField, World};
use mo_core::player::Pool;
use mo_core::{GameLoop, GameRng, GameState, LoopOutcome, PLAYER_FOOD_ALERT};
use proptest::prelude::*;

/// Scripted front end: keys come from a string, polls from a list
#[derive(Default)]
struct MockHost {
    keys: VecDeque<Key>,
    /// Answers for successive input polls; exhausted means no key
    polls: VecDeque<bool>,
    messages: Vec<String>,
    moves: Vec<Direction>,
    /// Run steps that succeed before the run hits something
    run_room: usize,
    run_steps: usize,
    /// Everything the host saw, in order
    events: Vec<String>,
}

impl MockHost {
    fn new(keys: &str) -> Self {
        Self {
            keys: keys.bytes().map(Key).collect(),
            ..Self::default()
        }
    }
}

impl Screen for MockHost {
    fn print_message(&mut self, text: &str) {
        self.events.push(format!("msg:{text}"));
        self.messages.push(text.to_string());
    }
    fn print_line(&mut self, _text: &str) {}
    fn print_stat(&mut self, _field: StatField, _state: &GameState) {}
}

impl Keyboard for MockHost {
    fn read_key(&mut self) -> Option<Key> {
        self.events.push("read_key".to_string());
        self.keys.pop_front()
    }
    fn poll_input(&mut self, _timeout_micros: u64) -> bool {
        self.polls.pop_front().unwrap_or(false)
    }
}

impl World for MockHost {
    fn move_player(&mut self, _state: &mut GameState, dir: Direction, _pickup: bool) -> ActionResult {
        self.events.push("move".to_string());
        self.moves.push(dir);
        ActionResult::Success
    }

    fn teleport_player(&mut self, _state: &mut GameState, range: u32) {
        self.events.push(format!("teleport:{range}"));
    }

    fn run_step(&mut self, _state: &mut GameState) -> bool {
        if self.run_steps < self.run_room {
            self.run_steps += 1;
            true
        } else {
            false
        }
    }
}

impl Persistence for MockHost {
    fn save_character(&mut self, _state: &GameState) -> bool {
        true
    }
}

fn rogue_game(host: MockHost) -> GameLoop<MockHost> {
    let mut state = GameState::new(GameRng::new(42));
    state.options.rogue_like_commands = true;
    GameLoop::new(state, host)
}

#[test]
fn test_repeat_count_moves_each_turn() {
    let mut game = rogue_game(MockHost::new("5l"));
    let outcome = game.run_level();

    assert_eq!(outcome, LoopOutcome::EndOfInput);
    assert_eq!(game.host().moves, vec![Direction::East; 5]);
    // Five moves plus the turn that found no more input
    assert_eq!(game.state().dungeon.turn, 6);
    assert_eq!(game.state().command.count, 0);
}

#[test]
fn test_keypress_interrupts_repeat() {
    let mut host = MockHost::new("5l");
    host.polls = VecDeque::from([false, true]);
    let mut game = rogue_game(host);
    game.run_level();

    assert_eq!(game.host().moves.len(), 2);
}

#[test]
fn test_original_layout_count_prefix() {
    let mut game = GameLoop::new(GameState::new(GameRng::new(1)), MockHost::new("#3 2"));
    game.run_level();

    assert_eq!(game.host().moves, vec![Direction::South; 3]);
}

#[test]
fn test_run_continues_until_blocked() {
    let mut host = MockHost::new("L");
    host.run_room = 4;
    let mut game = rogue_game(host);
    game.run_level();

    assert_eq!(game.host().moves, vec![Direction::East]);
    assert_eq!(game.host().run_steps, 4);
    assert!(!game.state().command.find);
}

#[test]
fn test_counted_run_stops_at_count() {
    let mut host = MockHost::new("3L");
    host.run_room = 50;
    let mut game = rogue_game(host);
    game.run_level();

    assert_eq!(game.host().moves.len(), 1);
    assert_eq!(game.host().run_steps, 2);
}

#[test]
fn test_hunger_interrupts_rest_once() {
    let mut game = rogue_game(MockHost::new("R20\r"));
    game.state_mut().player.food = 2001;
    game.run_level();

    let hungry = game
        .host()
        .messages
        .iter()
        .filter(|m| m.as_str() == "You are getting hungry.")
        .count();
    assert_eq!(hungry, 1);
    assert_eq!(game.state().player.timers.rest, 0);
    assert!(!game.state().player.is_resting());
}

#[test]
fn test_hunger_from_alert_never_repeats() {
    let mut game = rogue_game(MockHost::new("R20\r"));
    game.state_mut().player.food = PLAYER_FOOD_ALERT - 1;
    game.state_mut().player.timers.hero = 0;
    game.run_level();

    let messages = &game.host().messages;
    let hungry = "You are getting hungry.";
    assert_eq!(messages.iter().filter(|m| m.as_str() == hungry).count(), 1);
    assert!(messages.windows(2).all(|w| !(w[0] == hungry && w[1] == hungry)));
    assert!(!game.state().player.is_resting());
}

#[test]
fn test_condition_messages_shown_before_key_read() {
    let mut game = rogue_game(MockHost::new("l"));
    game.state_mut().player.timers.hero = 5;
    game.turn();

    let events = &game.host().events;
    let hero = events.iter().position(|e| e == "msg:You feel like a HERO!");
    let read = events.iter().position(|e| e == "read_key");
    let moved = events.iter().position(|e| e == "move");
    assert!(hero.is_some());
    assert!(hero < read);
    assert!(read < moved);
}

#[test]
fn test_random_teleport_lands_before_the_move() {
    let keys = "l".repeat(2000);
    let mut game = rogue_game(MockHost::new(&keys));
    game.state_mut().player.random_teleport = true;
    for _ in 0..2000 {
        game.turn();
        if game.host().events.iter().any(|e| e.starts_with("teleport")) {
            break;
        }
    }

    let events: Vec<&str> = game
        .host()
        .events
        .iter()
        .map(String::as_str)
        .filter(|e| !e.starts_with("msg:"))
        .collect();
    let at = events
        .iter()
        .position(|e| *e == "teleport:40")
        .expect("random teleport never fired");
    assert_eq!(events[at + 1..], ["read_key", "move"]);
}

#[test]
fn test_poison_damage_follows_turn_counter() {
    let mut game = rogue_game(MockHost::new("llllllll"));
    {
        let player = &mut game.state_mut().player;
        player.hp = Pool::new(50);
        player.constitution = 18;
        player.timers.poisoned = 20;
    }
    for _ in 0..8 {
        let before = game.state().player.hp.cur;
        game.turn();
        let turn = game.state().dungeon.turn;
        let lost = before - game.state().player.hp.cur;
        assert_eq!(lost, i32::from(turn % 2 == 0), "turn {turn}");
    }
    assert_eq!(game.state().player.hp.cur, 46);
}

#[test]
fn test_unknown_key_takes_no_time() {
    let mut game = rogue_game(MockHost::new("~~l"));
    game.turn();

    assert_eq!(game.state().dungeon.turn, 1);
    assert_eq!(game.host().moves.len(), 1);
}

#[test]
fn test_quit_ends_game() {
    let mut game = rogue_game(MockHost::new("Qy"));
    let outcome = game.run_level();

    assert_eq!(outcome, LoopOutcome::Died);
    assert_eq!(game.state().dungeon.died_from, "Quitting");
}

proptest! {
    #[test]
    fn prop_count_repeats_exactly(count in 1i32..=99) {
        let mut game = rogue_game(MockHost::new(&format!("{count}j")));
        game.run_level();
        prop_assert_eq!(game.host().moves.len(), count as usize);
    }
}
