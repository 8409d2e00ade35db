//! Key bindings
//!
//! Commands are bound in the roguelike alphabet. Original-layout keys are
//! translated into it first; everything here is a pure lookup.

use strum::IntoEnumIterator;

use super::{Command, Direction, WizardCommand};
use crate::interface::Key;

/// Result of translating an original-layout key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    Key(Key),
    /// `.` : read a direction and run that way
    Run,
    /// `T` : read a direction and tunnel that way
    Tunnel,
}

const fn ctrl(letter: u8) -> u8 {
    Key::ctrl(letter).0
}

/// Translate an original-layout key to the roguelike alphabet
///
/// Keys with no original binding become `~`, which nothing is bound to.
pub const fn original_to_canonical(key: Key) -> Translation {
    let canonical = match key.0 {
        b'.' => return Translation::Run,
        b'T' => return Translation::Tunnel,

        k if k == ctrl(b'K') => b'Q',
        k if k == ctrl(b'J') || k == ctrl(b'M') => b'+',
        k if k == ctrl(b'P') || k == ctrl(b'W') || k == ctrl(b'X') || k == ctrl(b'V') => k,
        b' ' | b'!' | b'$' => key.0,
        b'/' | b'<' | b'>' | b'-' | b'=' | b'{' | b'?' | b'A' => key.0,

        b'1' => b'b',
        b'2' => b'j',
        b'3' => b'n',
        b'4' => b'h',
        b'5' => b'.',
        b'6' => b'l',
        b'7' => b'y',
        b'8' => b'k',
        b'9' => b'u',

        b'B' => b'f',
        b'C' | b'D' | b'E' | b'F' | b'G' => key.0,
        b'L' => b'W',
        b'M' | b'R' | b'V' => key.0,
        b'S' => b'#',
        b'a' => b'z',
        b'b' => b'P',
        b'c' | b'd' | b'e' => key.0,
        b'f' => b't',
        b'h' => b'?',
        b'i' => key.0,
        b'j' => b'S',
        b'l' => b'x',
        b'm' | b'o' | b'p' | b'q' | b'r' | b's' => key.0,
        b't' => b'T',
        b'u' => b'Z',
        b'v' | b'w' => key.0,
        b'x' => b'X',

        // Wizard commands
        k if k == ctrl(b'B') => ctrl(b'O'),
        k if k == ctrl(b'H') => b'\\',
        k if k == ctrl(b'L') => b'*',
        k if k == ctrl(b'U') => b'&',
        k if k == ctrl(b'A') || k == ctrl(b'D') || k == ctrl(b'I') => k,
        k if k == ctrl(b'T') || k == ctrl(b'E') || k == ctrl(b'F') || k == ctrl(b'G') => k,
        b':' | b'@' | b'+' => key.0,

        _ => b'~',
    };
    Translation::Key(Key(canonical))
}

/// Whether a roguelike-alphabet command takes a repeat count
pub const fn accepts_count(key: Key) -> bool {
    match key.0 {
        0x1b | b' ' | b'-' | b'.' | b'+' => true,
        b'b' | b'f' | b'j' | b'n' | b'h' | b'l' | b'y' | b'k' | b'u' => true,
        b'B' | b'J' | b'N' | b'H' | b'L' | b'Y' | b'K' | b'U' => true,
        b'D' | b'R' | b'S' | b'o' | b's' => true,
        k => {
            k == ctrl(b'P')
                || k == ctrl(b'Y')
                || k == ctrl(b'K')
                || k == ctrl(b'U')
                || k == ctrl(b'L')
                || k == ctrl(b'N')
                || k == ctrl(b'J')
                || k == ctrl(b'B')
                || k == ctrl(b'H')
                || k == ctrl(b'D')
                || k == ctrl(b'G')
        }
    }
}

/// What a bound key still needs before it is a complete command
#[derive(Debug, Clone)]
pub enum Binding {
    Ready(Command),
    /// Read a direction and build the command from it
    Directed(fn(Direction) -> Command),
    /// `-`: read a direction and step without picking up
    MoveWithoutPickup,
    Quit,
    ToggleWizard,
    Rest,
    GoToLevel,
}

/// Bind a roguelike-alphabet key
pub fn bind(key: Key) -> Binding {
    use Binding::{Directed, Ready};

    if let Some(dir) = walk_direction(key) {
        return Ready(Command::Move { dir, pickup: true });
    }
    if let Some(dir) = run_direction(key) {
        return Ready(Command::Run(dir));
    }
    if let Some(dir) = tunnel_direction(key) {
        return Ready(Command::Tunnel(dir));
    }

    match key.0 {
        b'Q' => Binding::Quit,
        k if k == ctrl(b'P') => Ready(Command::PreviousMessage),
        k if k == ctrl(b'V') => Ready(Command::ViewLicense),
        k if k == ctrl(b'W') => Binding::ToggleWizard,
        k if k == ctrl(b'X') => Ready(Command::SaveAndExit),
        b'=' => Ready(Command::Options),
        b'{' => Ready(Command::Inscribe),
        b'!' | b'$' => Ready(Command::ShellEscape),
        0x1b | b' ' => Ready(Command::Nothing),
        b'-' => Binding::MoveWithoutPickup,
        b'/' => Ready(Command::IdentifySymbol),
        b'.' => Ready(Command::Stay),
        b'<' => Ready(Command::GoUp),
        b'>' => Ready(Command::GoDown),
        b'?' => Ready(Command::Help),
        b'f' => Directed(Command::Bash),
        b'C' => Ready(Command::Character),
        b'D' => Directed(Command::DisarmTrap),
        b'E' => Ready(Command::Eat),
        b'F' => Ready(Command::RefillLamp),
        b'G' => Ready(Command::GainSpells),
        b'V' => Ready(Command::ViewScores),
        b'W' => Ready(Command::LocateMap),
        b'R' => Binding::Rest,
        b'#' => Ready(Command::ToggleSearch),
        b'z' => Ready(Command::AimWand),
        b'M' => Ready(Command::ScreenMap),
        b'P' => Ready(Command::Browse),
        b'c' => Directed(Command::CloseDoor),
        b'd' => Ready(Command::Drop),
        b'e' => Ready(Command::Equipment),
        b't' => Ready(Command::Throw),
        b'i' => Ready(Command::Inventory),
        b'S' => Directed(Command::JamDoor),
        b'x' => Ready(Command::Look),
        b'm' => Ready(Command::Cast),
        b'o' => Directed(Command::OpenDoor),
        b'p' => Ready(Command::Pray),
        b'q' => Ready(Command::Quaff),
        b'r' => Ready(Command::Read),
        b's' => Ready(Command::Search),
        b'T' => Ready(Command::TakeOff),
        b'Z' => Ready(Command::UseStaff),
        b'v' => Ready(Command::Version),
        b'w' => Ready(Command::Wear),
        b'X' => Ready(Command::Exchange),
        k if k == ctrl(b'D') => Binding::GoToLevel,
        _ => match wizard_command(key) {
            Some(wizard) => Ready(Command::Wizard(wizard)),
            None => Ready(Command::Unknown(key)),
        },
    }
}

fn walk_direction(key: Key) -> Option<Direction> {
    Direction::iter().find(|dir| dir.walk_key() == key)
}

fn run_direction(key: Key) -> Option<Direction> {
    Direction::iter().find(|dir| dir.run_key() == key)
}

fn tunnel_direction(key: Key) -> Option<Direction> {
    // Carriage return tunnels down, like line feed
    if key.0 == ctrl(b'M') {
        return Some(Direction::South);
    }
    Direction::iter().find(|dir| dir.tunnel_key() == key)
}

fn wizard_command(key: Key) -> Option<WizardCommand> {
    let command = match key.0 {
        b'\\' => WizardCommand::Help,
        b'*' => WizardCommand::Light,
        b':' => WizardCommand::MapArea,
        b'+' => WizardCommand::GainExperience,
        b'&' => WizardCommand::Summon,
        b'@' => WizardCommand::CreateItem,
        k if k == ctrl(b'A') => WizardCommand::CureAll,
        k if k == ctrl(b'E') => WizardCommand::CharacterEdit,
        k if k == ctrl(b'F') => WizardCommand::Genocide,
        k if k == ctrl(b'G') => WizardCommand::Treasure,
        k if k == ctrl(b'O') => WizardCommand::ObjectList,
        k if k == ctrl(b'I') => WizardCommand::Identify,
        k if k == ctrl(b'T') => WizardCommand::Teleport,
        _ => return None,
    };
    Some(command)
}
