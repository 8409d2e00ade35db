//! Player command system
//!
//! Keys are decoded into a [`Command`] (with every prompt already answered)
//! and the dispatcher runs it, noting whether it took game time.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::interface::Key;

pub mod decode;
pub mod dispatch;
pub mod keymap;

pub use decode::decode;
pub use dispatch::dispatch;

/// Movement directions, numbered as on a keypad (5 is "here")
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Direction {
    SouthWest = 1,
    South = 2,
    SouthEast = 3,
    West = 4,
    East = 6,
    NorthWest = 7,
    North = 8,
    NorthEast = 9,
}

impl Direction {
    /// Direction for a keypad digit; 5 and out-of-range digits have none
    pub const fn from_keypad(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Direction::SouthWest),
            2 => Some(Direction::South),
            3 => Some(Direction::SouthEast),
            4 => Some(Direction::West),
            6 => Some(Direction::East),
            7 => Some(Direction::NorthWest),
            8 => Some(Direction::North),
            9 => Some(Direction::NorthEast),
            _ => None,
        }
    }

    pub const fn keypad(&self) -> u8 {
        *self as u8
    }

    /// Get the delta (dx, dy) for this direction
    pub const fn delta(&self) -> (i8, i8) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    /// Walk key in the roguelike alphabet (`hjklyubn`)
    pub const fn walk_key(&self) -> Key {
        Key(match self {
            Direction::SouthWest => b'b',
            Direction::South => b'j',
            Direction::SouthEast => b'n',
            Direction::West => b'h',
            Direction::East => b'l',
            Direction::NorthWest => b'y',
            Direction::North => b'k',
            Direction::NorthEast => b'u',
        })
    }

    /// Run key: the walk key shifted
    pub const fn run_key(&self) -> Key {
        Key(self.walk_key().0.to_ascii_uppercase())
    }

    /// Tunnel key: the walk key as a control code
    pub const fn tunnel_key(&self) -> Key {
        Key::ctrl(self.walk_key().0)
    }

    /// Direction answering a direction prompt
    ///
    /// Digits always work; roguelike players may also use their walk keys.
    pub fn from_key(key: Key, rogue_like: bool) -> Option<Self> {
        if let Some(digit) = key.digit() {
            return Self::from_keypad(digit);
        }
        if !rogue_like {
            return None;
        }
        Self::from_walk_key(key)
    }

    fn from_walk_key(key: Key) -> Option<Self> {
        match key.0 {
            b'b' => Some(Direction::SouthWest),
            b'j' => Some(Direction::South),
            b'n' => Some(Direction::SouthEast),
            b'h' => Some(Direction::West),
            b'l' => Some(Direction::East),
            b'y' => Some(Direction::NorthWest),
            b'k' => Some(Direction::North),
            b'u' => Some(Direction::NorthEast),
            _ => None,
        }
    }
}

/// How long to rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestLength {
    Turns(i32),
    /// Until hit points and mana are full, or disturbed
    UntilDone,
}

/// Debugging commands, available only in wizard mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum WizardCommand {
    CureAll,
    CharacterEdit,
    Genocide,
    /// Scatter treasure; the host reads the repeat count before it is cleared
    Treasure,
    /// Target depth, or `None` when the prompt was abandoned
    GoToLevel(Option<i32>),
    ObjectList,
    Help,
    Identify,
    Light,
    MapArea,
    Teleport,
    GainExperience,
    Summon,
    CreateItem,
}

/// A fully decoded player command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // Session
    Quit { confirmed: bool },
    PreviousMessage,
    ViewLicense,
    ToggleWizard { confirmed: bool },
    SaveAndExit,
    Options,
    Inscribe,
    ShellEscape,
    Nothing,

    // Movement
    Move { dir: Direction, pickup: bool },
    Run(Direction),
    Stay,
    GoUp,
    GoDown,
    Rest(RestLength),
    Tunnel(Direction),

    // Information
    IdentifySymbol,
    Help,
    Character,
    ViewScores,
    LocateMap,
    ScreenMap,
    Browse,
    Look,
    Version,
    Inventory,
    Equipment,

    // Actions
    Bash(Direction),
    DisarmTrap(Direction),
    Eat,
    RefillLamp,
    GainSpells,
    ToggleSearch,
    AimWand,
    CloseDoor(Direction),
    Drop,
    Throw,
    JamDoor(Direction),
    Cast,
    OpenDoor(Direction),
    Pray,
    Quaff,
    Read,
    Search,
    TakeOff,
    UseStaff,
    Wear,
    Exchange,

    Wizard(WizardCommand),
    /// A key with no binding
    Unknown(Key),
}

impl Command {
    /// Commands that never advance the clock, whatever their handler says
    pub fn is_free(&self) -> bool {
        matches!(
            self,
            Command::Quit { .. }
                | Command::PreviousMessage
                | Command::ViewLicense
                | Command::ToggleWizard { .. }
                | Command::SaveAndExit
                | Command::Options
                | Command::Inscribe
                | Command::ShellEscape
                | Command::Nothing
                | Command::IdentifySymbol
                | Command::Help
                | Command::Character
                | Command::ViewScores
                | Command::LocateMap
                | Command::ToggleSearch
                | Command::ScreenMap
                | Command::Browse
                | Command::Look
                | Command::Version
                | Command::Inventory
                | Command::Equipment
                | Command::Wizard(_)
                | Command::Unknown(_)
        )
    }
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// Action completed successfully, time passes
    Success,
    /// Action completed but no time passes
    NoTime,
    /// Action was cancelled
    Cancelled,
    /// Action failed with message
    Failed(String),
}

impl ActionResult {
    pub fn took_time(&self) -> bool {
        matches!(self, ActionResult::Success)
    }
}

/// Command-loop bookkeeping carried between turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandState {
    /// Remaining repeats of the last command
    pub count: i32,
    pub last: Option<Command>,
    /// The command just run took no game time
    pub free_turn: bool,
    /// Running
    pub find: bool,
    /// Steps left in a counted run; negative runs until something interesting
    pub find_count: i32,
    /// The current command is a repeat and reuses its stored direction
    pub default_dir: bool,
}
