//! Turning keystrokes into commands
//!
//! Handles the repeat-count prefix, `^` control shorthand, the original
//! key layout and every follow-up prompt (direction, rest length,
//! confirmations), so the dispatcher never reads the keyboard.

use super::keymap::{self, Binding, Translation};
use super::{Command, Direction, RestLength, WizardCommand};
use crate::consts::{MAX_REPEAT_COUNT, MAX_WIZARD_DEPTH};
use crate::gameloop::GameState;
use crate::interface::{Host, Key, deliver};

/// Read and decode the next command
///
/// While a repeat count is pending the last command is returned again
/// without touching the keyboard.
pub fn decode<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> Command {
    if state.command.count > 0 {
        if let Some(last) = state.command.last.clone() {
            state.command.default_dir = true;
            return last;
        }
        state.command.count = 0;
    }

    let mut key = read_key(state, host);
    if state.dungeon.eof {
        return Command::Nothing;
    }

    let rogue_like = state.options.rogue_like_commands;
    let mut counter = 0;
    let count_prefix = if rogue_like {
        key.is_digit()
    } else {
        key == Key(b'#')
    };
    if count_prefix {
        (counter, key) = read_count(state, host, key);
    }

    if key == Key(b'^') {
        key = read_control(state, host);
    }

    if !rogue_like {
        key = match keymap::original_to_canonical(key) {
            Translation::Key(key) => key,
            Translation::Run => get_dir(state, host).map_or(Key::SPACE, |dir| dir.run_key()),
            Translation::Tunnel => get_dir(state, host).map_or(Key::SPACE, |dir| dir.tunnel_key()),
        };
    }

    if counter > 0 {
        if keymap::accepts_count(key) {
            state.command.count = counter;
            state.print_state();
        } else {
            key = Key::SPACE;
            state.message("Invalid command with a count.");
        }
    }

    let command = resolve(state, host, key);
    tracing::trace!(key = key.0, ?command, count = state.command.count, "decoded");
    command
}

/// Accumulate a repeat count starting from `first`
///
/// Returns the count and the key that ended it.
fn read_count<H: Host + ?Sized>(state: &mut GameState, host: &mut H, first: Key) -> (i32, Key) {
    host.print_line("Repeat count:");
    let mut key = if first == Key(b'#') { Key(b'0') } else { first };
    let mut counter: i32 = 0;

    loop {
        if key.is_erase() {
            counter /= 10;
            echo_count(state, host, counter);
        } else if let Some(digit) = key.digit() {
            let next = counter * 10 + i32::from(digit);
            if next > MAX_REPEAT_COUNT {
                bell(state, host);
            } else {
                counter = next;
                echo_count(state, host, counter);
            }
        } else {
            break;
        }
        key = read_key(state, host);
    }

    if counter == 0 {
        counter = MAX_REPEAT_COUNT;
        echo_count(state, host, counter);
    }

    // Lets a digit be typed as the command itself
    if key == Key::SPACE {
        host.print_line("Command:");
        key = read_key(state, host);
    }

    (counter, key)
}

fn echo_count<H: Host + ?Sized>(state: &GameState, host: &mut H, counter: i32) {
    if state.options.display_counts {
        host.print_line(&format!("Repeat count: {counter}"));
    }
}

/// `^` followed by a letter types that control code
fn read_control<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> Key {
    host.print_line("Control-");
    let letter = read_key(state, host);
    if letter == Key::ESCAPE {
        Key::SPACE
    } else if letter.0.is_ascii_alphabetic() {
        Key::ctrl(letter.0)
    } else {
        state.message("Type ^ <letter> for a control char");
        Key::SPACE
    }
}

/// Complete a bound key into a command, prompting as needed
fn resolve<H: Host + ?Sized>(state: &mut GameState, host: &mut H, key: Key) -> Command {
    match keymap::bind(key) {
        Binding::Ready(command) => command,
        Binding::Directed(make) => get_dir(state, host).map_or(Command::Nothing, make),
        Binding::MoveWithoutPickup => match get_dir(state, host) {
            Some(dir) => Command::Move { dir, pickup: false },
            None => Command::Nothing,
        },
        Binding::Quit => {
            host.discard_input();
            Command::Quit {
                confirmed: get_check(state, host, "Do you really want to quit?"),
            }
        }
        Binding::ToggleWizard => Command::ToggleWizard {
            confirmed: confirm_wizard(state, host),
        },
        Binding::Rest => Command::Rest(rest_length(state, host)),
        Binding::GoToLevel => Command::Wizard(WizardCommand::GoToLevel(target_level(state, host))),
    }
}

/// Leaving wizard mode, or re-entering it after scoring is already lost,
/// needs no confirmation
fn confirm_wizard<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> bool {
    if state.dungeon.wizard || state.dungeon.noscore {
        return true;
    }
    if !state.options.wizard_allowed {
        return false;
    }
    state.message("Wizard mode is for debugging and experimenting.");
    deliver(state, host);
    get_check(
        state,
        host,
        "The game will not be scored if you enter wizard mode. Are you sure?",
    )
}

fn rest_length<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> RestLength {
    if state.command.count > 0 {
        return RestLength::Turns(state.command.count);
    }
    match get_string(state, host, "Rest (0-9999): ", 5) {
        Some(text) if text.starts_with('*') => RestLength::UntilDone,
        Some(text) => RestLength::Turns(leading_int(&text)),
        None => RestLength::Turns(0),
    }
}

/// Depth for the wizard level jump; only prompts in wizard mode
fn target_level<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> Option<i32> {
    if !state.dungeon.wizard {
        return None;
    }
    let count = state.command.count;
    if count > 0 {
        return Some(if count > MAX_WIZARD_DEPTH { 0 } else { count });
    }
    get_string(state, host, "Go to which level (0-99) ? ", 10)
        .map(|text| leading_int(&text))
        .filter(|&level| level > -1)
}

/// Read a key, turning end of input into escape
pub fn read_key<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> Key {
    match host.read_key() {
        Some(key) => key,
        None => {
            if !state.dungeon.eof {
                tracing::info!("end of input");
            }
            state.dungeon.eof = true;
            Key::ESCAPE
        }
    }
}

/// Prompt until a direction or escape is typed
pub fn get_dir<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> Option<Direction> {
    let rogue_like = state.options.rogue_like_commands;
    loop {
        host.print_line("Which direction?");
        let key = read_key(state, host);
        if key == Key::ESCAPE {
            return None;
        }
        if let Some(dir) = Direction::from_key(key, rogue_like) {
            return Some(dir);
        }
        bell(state, host);
    }
}

/// Yes/no question; anything but `y` is no
pub fn get_check<H: Host + ?Sized>(state: &mut GameState, host: &mut H, prompt: &str) -> bool {
    host.print_line(&format!("{prompt} [y/n]"));
    let key = read_key(state, host);
    matches!(key.0, b'y' | b'Y')
}

/// Read a line of at most `max_len` characters; escape abandons it
pub fn get_string<H: Host + ?Sized>(
    state: &mut GameState,
    host: &mut H,
    prompt: &str,
    max_len: usize,
) -> Option<String> {
    host.print_line(prompt);
    let mut text = String::new();
    loop {
        let key = read_key(state, host);
        if key == Key::ESCAPE {
            return None;
        }
        if key.is_return() {
            return Some(text);
        }
        if key.is_erase() {
            text.pop();
        } else if (b' '..0x7f).contains(&key.0) && text.len() < max_len {
            text.push(char::from(key.0));
        } else {
            bell(state, host);
            continue;
        }
        host.print_line(&format!("{prompt}{text}"));
    }
}

fn bell<H: Host + ?Sized>(state: &GameState, host: &mut H) {
    if state.options.sound_beep {
        host.bell();
    }
}

/// Leading signed integer, 0 when there is none
fn leading_int(text: &str) -> i32 {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |n, d| n.saturating_mul(10).saturating_add(i32::from(d - b'0')));
    sign * value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameRng;
    use crate::action::ActionResult;
    use crate::interface::{Keyboard, Persistence, Screen, StatField, World};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Script {
        keys: VecDeque<Key>,
        lines: Vec<String>,
        bells: usize,
    }

    impl Script {
        fn new(keys: &str) -> Self {
            Self {
                keys: keys.bytes().map(Key).collect(),
                ..Self::default()
            }
        }
    }

    impl Screen for Script {
        fn print_message(&mut self, _text: &str) {}
        fn print_line(&mut self, text: &str) {
            self.lines.push(text.to_string());
        }
        fn print_stat(&mut self, _field: StatField, _state: &GameState) {}
        fn bell(&mut self) {
            self.bells += 1;
        }
    }

    impl Keyboard for Script {
        fn read_key(&mut self) -> Option<Key> {
            self.keys.pop_front()
        }
        fn poll_input(&mut self, _timeout_micros: u64) -> bool {
            false
        }
    }

    impl World for Script {
        fn move_player(&mut self, _: &mut GameState, _: Direction, _: bool) -> ActionResult {
            ActionResult::Success
        }
    }

    impl Persistence for Script {
        fn save_character(&mut self, _state: &GameState) -> bool {
            true
        }
    }

    fn state(rogue_like: bool) -> GameState {
        let mut state = GameState::new(GameRng::new(2));
        state.options.rogue_like_commands = rogue_like;
        state
    }

    fn run(state: &mut GameState, keys: &str) -> (Command, Script) {
        let mut host = Script::new(keys);
        let command = decode(state, &mut host);
        (command, host)
    }

    #[test]
    fn test_roguelike_count_prefix() {
        let mut state = state(true);
        let (command, _) = run(&mut state, "5l");
        assert_eq!(command, Command::Move { dir: Direction::East, pickup: true });
        assert_eq!(state.command.count, 5);
    }

    #[test]
    fn test_original_count_prefix() {
        let mut state = state(false);
        let (command, _) = run(&mut state, "#12 6");
        assert_eq!(command, Command::Move { dir: Direction::East, pickup: true });
        assert_eq!(state.command.count, 12);
    }

    #[test]
    fn test_bare_count_means_ninety_nine() {
        let mut state = state(false);
        let (command, _) = run(&mut state, "#s");
        assert_eq!(command, Command::Search);
        assert_eq!(state.command.count, 99);
    }

    #[test]
    fn test_count_capped_with_bell() {
        let mut state = state(true);
        let (command, host) = run(&mut state, "123 s");
        assert_eq!(command, Command::Search);
        assert_eq!(state.command.count, 12);
        assert_eq!(host.bells, 1);
    }

    #[test]
    fn test_count_backspace() {
        let mut state = state(true);
        let (_, _) = run(&mut state, "47\x7f3s");
        assert_eq!(state.command.count, 43);
    }

    #[test]
    fn test_space_allows_digit_command() {
        let mut state = state(false);
        let (command, _) = run(&mut state, "#3 2");
        assert_eq!(command, Command::Move { dir: Direction::South, pickup: true });
        assert_eq!(state.command.count, 3);
    }

    #[test]
    fn test_count_rejected_by_command() {
        let mut state = state(true);
        let (command, _) = run(&mut state, "3i");
        assert_eq!(command, Command::Nothing);
        assert_eq!(state.command.count, 0);
        assert_eq!(state.messages.last(), Some("Invalid command with a count."));
    }

    #[test]
    fn test_pending_count_repeats_last() {
        let mut state = state(true);
        state.command.count = 3;
        state.command.last = Some(Command::Run(Direction::North));
        let (command, host) = run(&mut state, "");
        assert_eq!(command, Command::Run(Direction::North));
        assert!(state.command.default_dir);
        assert!(host.lines.is_empty());
    }

    #[test]
    fn test_caret_control_shorthand() {
        let mut state = state(true);
        let (command, _) = run(&mut state, "^p");
        assert_eq!(command, Command::PreviousMessage);

        let (command, _) = run(&mut state, "^5");
        assert_eq!(command, Command::Nothing);
        assert_eq!(state.messages.last(), Some("Type ^ <letter> for a control char"));
    }

    #[test]
    fn test_original_run_and_tunnel() {
        let mut state = state(false);
        let (command, _) = run(&mut state, ".4");
        assert_eq!(command, Command::Run(Direction::West));
        let (command, _) = run(&mut state, "T9");
        assert_eq!(command, Command::Tunnel(Direction::NorthEast));
        let (command, _) = run(&mut state, ".\x1b");
        assert_eq!(command, Command::Nothing);
    }

    #[test]
    fn test_direction_prompt_retries() {
        let mut state = state(true);
        let (command, host) = run(&mut state, "ox5k");
        assert_eq!(command, Command::OpenDoor(Direction::North));
        assert_eq!(host.bells, 2);
    }

    #[test]
    fn test_move_without_pickup_keeps_count() {
        let mut state = state(true);
        let (command, _) = run(&mut state, "4-l");
        assert_eq!(command, Command::Move { dir: Direction::East, pickup: false });
        assert_eq!(state.command.count, 4);
    }

    #[test]
    fn test_quit_confirmation() {
        let mut state = state(true);
        assert_eq!(run(&mut state, "Qy").0, Command::Quit { confirmed: true });
        assert_eq!(run(&mut state, "Qn").0, Command::Quit { confirmed: false });
    }

    #[test]
    fn test_rest_prompt() {
        let mut state = state(true);
        assert_eq!(
            run(&mut state, "R*\r").0,
            Command::Rest(RestLength::UntilDone)
        );
        assert_eq!(
            run(&mut state, "R25\r").0,
            Command::Rest(RestLength::Turns(25))
        );
        assert_eq!(
            run(&mut state, "R\x1b").0,
            Command::Rest(RestLength::Turns(0))
        );
    }

    #[test]
    fn test_rest_takes_count() {
        let mut state = state(true);
        let (command, host) = run(&mut state, "7R");
        assert_eq!(command, Command::Rest(RestLength::Turns(7)));
        assert!(!host.lines.iter().any(|l| l.starts_with("Rest")));
    }

    #[test]
    fn test_wizard_level_prompt_only_in_wizard_mode() {
        let mut state = state(true);
        let (command, host) = run(&mut state, "\x04");
        assert_eq!(command, Command::Wizard(WizardCommand::GoToLevel(None)));
        assert!(host.lines.is_empty());

        state.dungeon.wizard = true;
        let (command, _) = run(&mut state, "\x0412\r");
        assert_eq!(command, Command::Wizard(WizardCommand::GoToLevel(Some(12))));
        let (command, _) = run(&mut state, "\x04-3\r");
        assert_eq!(command, Command::Wizard(WizardCommand::GoToLevel(None)));
    }

    #[test]
    fn test_wizard_toggle_asks_once() {
        let mut state = state(true);
        let (command, host) = run(&mut state, "\x17y");
        assert_eq!(command, Command::ToggleWizard { confirmed: true });
        assert!(host.lines.iter().any(|l| l.contains("will not be scored")));

        state.dungeon.noscore = true;
        let (command, host) = run(&mut state, "\x17");
        assert_eq!(command, Command::ToggleWizard { confirmed: true });
        assert!(host.lines.is_empty());
    }

    #[test]
    fn test_end_of_input() {
        let mut state = state(false);
        let (command, _) = run(&mut state, "");
        assert_eq!(command, Command::Nothing);
        assert!(state.dungeon.eof);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("42abc"), 42);
        assert_eq!(leading_int("  -7"), -7);
        assert_eq!(leading_int("x"), 0);
        assert_eq!(leading_int(""), 0);
    }
}
