//! Collaborator seams
//!
//! The engine owns the turn; everything it does not own (drawing, key
//! input, the map and its monsters, persistence) sits behind these traits.
//! A front end implements all four and the blanket [`Host`] ties them
//! together.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::action::{ActionResult, Command, Direction};
use crate::gameloop::GameState;

/// A single keystroke as a raw byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(pub u8);

impl Key {
    pub const ESCAPE: Key = Key(0x1b);
    pub const DELETE: Key = Key(0x7f);
    pub const SPACE: Key = Key(b' ');

    /// Control code for a letter (`Key::ctrl(b'P')` is `^P`)
    pub const fn ctrl(letter: u8) -> Key {
        Key(letter & 0x1f)
    }

    pub const fn is_digit(self) -> bool {
        self.0.is_ascii_digit()
    }

    /// Numeric value of a digit key
    pub const fn digit(self) -> Option<u8> {
        if self.is_digit() {
            Some(self.0 - b'0')
        } else {
            None
        }
    }

    /// Enter or line feed
    pub const fn is_return(self) -> bool {
        self.0 == b'\r' || self.0 == b'\n'
    }

    /// Backspace or delete
    pub const fn is_erase(self) -> bool {
        self.0 == Key::DELETE.0 || self.0 == Key::ctrl(b'H').0
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key(c as u8)
    }
}

/// Status line fields the screen may be asked to redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum StatField {
    Hunger,
    Blind,
    Confused,
    Afraid,
    Poisoned,
    MaxHp,
    CurrentHp,
    Mana,
    ArmorClass,
    Speed,
    /// Paralysed / resting / repeat / searching line
    State,
    Stats,
    Depth,
    Experience,
    Winner,
    Study,
}

/// Staircase under the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stairs {
    Up,
    Down,
}

/// Side effects queued while the engine has no access to the host
///
/// Timed effects only see `&mut GameState`; they queue what they need and
/// the clock hands the queue to the host with [`deliver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Message(String),
    Stat(StatField),
    RefreshMap,
    /// Re-light visible monsters without moving them
    UpdateMonsters,
    CheckView,
    Teleport(u32),
    Flush,
    Bell,
}

/// Drawing surface
pub trait Screen {
    /// Show and remember a game message
    fn print_message(&mut self, text: &str);

    /// Put transient text on the top line (prompts, hints)
    fn print_line(&mut self, text: &str);

    /// Redraw one status field from the current state
    fn print_stat(&mut self, field: StatField, state: &GameState);

    /// Show several lines at once and wait for acknowledgement
    fn show_lines(&mut self, lines: &[String]) {
        for line in lines {
            self.print_line(line);
        }
    }

    fn refresh_map(&mut self, _state: &GameState) {}

    fn flush_output(&mut self) {}

    fn bell(&mut self) {}
}

/// Key input
pub trait Keyboard {
    /// Block for the next key; `None` means input is exhausted
    fn read_key(&mut self) -> Option<Key>;

    /// Wait up to `timeout_micros` for a key, consuming it if one arrives
    fn poll_input(&mut self, timeout_micros: u64) -> bool;

    /// Drop any type-ahead
    fn discard_input(&mut self) {}
}

/// The dungeon: map, monsters, stores and every item or spell effect
pub trait World {
    /// Build the level at `state.dungeon.depth`
    fn generate_level(&mut self, _state: &mut GameState) {}

    fn restock_stores(&mut self, _state: &mut GameState) {}

    /// Place a wandering monster out of sight
    fn spawn_monster(&mut self, _state: &mut GameState) {}

    /// Let monsters act; with `may_move` false they are only re-lit
    fn advance_monsters(&mut self, _state: &mut GameState, _may_move: bool) {}

    fn update_monsters(&mut self, state: &mut GameState) {
        self.advance_monsters(state, false);
    }

    fn monster_list_nearly_full(&self, _state: &GameState) -> bool {
        false
    }

    fn compact_monsters(&mut self, _state: &mut GameState) {}

    fn check_view(&mut self, _state: &mut GameState) {}

    fn teleport_player(&mut self, _state: &mut GameState, _range: u32) {}

    fn check_strength(&mut self, _state: &mut GameState) {}

    fn stairs_here(&self, _state: &GameState) -> Option<Stairs> {
        None
    }

    /// Step one square; blocked movement reports `NoTime`
    fn move_player(
        &mut self,
        state: &mut GameState,
        dir: Direction,
        pickup: bool,
    ) -> ActionResult;

    /// Spend a turn without moving
    fn stay_in_place(&mut self, _state: &mut GameState) {}

    /// First step of a run; the engine sets find mode before calling
    fn begin_run(&mut self, state: &mut GameState, dir: Direction) -> ActionResult {
        self.move_player(state, dir, true)
    }

    /// Continue a run; returns false when the run should stop
    fn run_step(&mut self, _state: &mut GameState) -> bool {
        false
    }

    fn tunnel(&mut self, _state: &mut GameState, _dir: Direction) -> ActionResult {
        ActionResult::Failed("You can't tunnel through that.".to_string())
    }

    /// Item, magic and interface commands the engine does not handle itself
    fn perform(&mut self, _state: &mut GameState, _command: &Command) -> ActionResult {
        ActionResult::Cancelled
    }
}

/// Character persistence
pub trait Persistence {
    /// Write the character out; false when saving failed
    fn save_character(&mut self, state: &GameState) -> bool;
}

/// Everything the turn engine needs from its front end
pub trait Host: Screen + Keyboard + World + Persistence {}

impl<T: Screen + Keyboard + World + Persistence> Host for T {}

/// Hand every queued request to the host
pub fn deliver<H: Host + ?Sized>(state: &mut GameState, host: &mut H) {
    while !state.requests.is_empty() {
        for request in std::mem::take(&mut state.requests) {
            match request {
                Request::Message(text) => host.print_message(&text),
                Request::Stat(field) => host.print_stat(field, state),
                Request::RefreshMap => host.refresh_map(state),
                Request::UpdateMonsters => host.update_monsters(state),
                Request::CheckView => host.check_view(state),
                Request::Teleport(range) => host.teleport_player(state, range),
                Request::Flush => host.flush_output(),
                Request::Bell => {
                    if state.options.sound_beep {
                        host.bell();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_keys() {
        assert_eq!(Key::ctrl(b'A'), Key(1));
        assert_eq!(Key::ctrl(b'a'), Key(1));
        assert_eq!(Key::ctrl(b'H'), Key(8));
        assert!(Key::ctrl(b'H').is_erase());
        assert!(Key::DELETE.is_erase());
    }

    #[test]
    fn test_digits() {
        assert_eq!(Key::from('7').digit(), Some(7));
        assert_eq!(Key::from('x').digit(), None);
        assert!(Key(b'\r').is_return());
    }
}
