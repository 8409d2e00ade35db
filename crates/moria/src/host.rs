//! Line-oriented terminal front end
//!
//! Messages scroll, prompts overwrite the current line and status fields
//! are batched into one summary line per flush.

use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use mo_core::GameState;
use mo_core::action::{ActionResult, Command, Direction};
use mo_core::interface::{Key, Keyboard, Persistence, Screen, Stairs, StatField, World};
use mo_core::player::StatusFlags;

use crate::room::Room;
use crate::save;

pub struct TerminalHost {
    out: Stdout,
    room: Room,
    save_path: PathBuf,
    rogue_like: bool,
    /// Status fields redrawn since the last flush
    dirty: Vec<(StatField, String)>,
    /// A prompt is on the current line
    prompting: bool,
}

impl TerminalHost {
    pub fn new(save_path: PathBuf, rogue_like: bool) -> Self {
        Self {
            out: io::stdout(),
            room: Room::default(),
            save_path,
            rogue_like,
            dirty: Vec::new(),
            prompting: false,
        }
    }

    fn write_line(&mut self, text: &str, newline: bool) {
        let result = queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(text)
        )
        .and_then(|()| {
            if newline {
                queue!(self.out, Print("\r\n"))
            } else {
                Ok(())
            }
        })
        .and_then(|()| self.out.flush());
        if let Err(err) = result {
            tracing::error!(%err, "terminal write failed");
        }
        self.prompting = !newline;
    }

    /// Print pending status changes as one line
    fn write_status(&mut self) {
        let summary: Vec<String> = self
            .dirty
            .drain(..)
            .map(|(_, text)| text)
            .filter(|text| !text.is_empty())
            .collect();
        if !summary.is_empty() {
            self.write_line(&format!("[{}]", summary.join(" | ")), true);
        }
    }

    /// Translate a key event into the byte the engine reads
    fn translate(&self, key: KeyEvent) -> Option<Key> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let arrow = |dir: Direction| {
            if self.rogue_like {
                dir.walk_key()
            } else {
                Key(b'0' + dir.keypad())
            }
        };
        match key.code {
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                c.is_ascii_alphabetic().then(|| Key::ctrl(c as u8))
            }
            KeyCode::Char(c) if c.is_ascii() => Some(Key(c as u8)),
            KeyCode::Enter => Some(Key(b'\r')),
            KeyCode::Esc => Some(Key::ESCAPE),
            KeyCode::Backspace => Some(Key::DELETE),
            KeyCode::Up => Some(arrow(Direction::North)),
            KeyCode::Down => Some(arrow(Direction::South)),
            KeyCode::Left => Some(arrow(Direction::West)),
            KeyCode::Right => Some(arrow(Direction::East)),
            _ => None,
        }
    }
}

/// Status line text for one field
pub fn stat_text(field: StatField, state: &GameState) -> String {
    let player = &state.player;
    let timers = &player.timers;
    let flag = |on: bool, label: &str| if on { label.to_string() } else { String::new() };
    match field {
        StatField::MaxHp | StatField::CurrentHp => {
            format!("HP {}/{}", player.hp.cur, player.hp.max)
        }
        StatField::Mana => format!("Mana {}/{}", player.mana.cur, player.mana.max),
        StatField::Hunger => player.hunger().status_string().unwrap_or_default().to_string(),
        StatField::Blind => flag(timers.blind > 0, "Blind"),
        StatField::Confused => flag(timers.confused > 0, "Confused"),
        StatField::Afraid => flag(timers.afraid > 0, "Afraid"),
        StatField::Poisoned => flag(timers.poisoned > 0, "Poisoned"),
        StatField::ArmorClass => format!("AC {}", player.dis_ac),
        StatField::Speed => match player.speed {
            0 => String::new(),
            s if s < 0 => "Fast".to_string(),
            _ => "Slow".to_string(),
        },
        StatField::State => {
            if timers.paralysis > 1 {
                "Paralysed".to_string()
            } else if player.status.contains(StatusFlags::REST) {
                if timers.rest < 0 {
                    "Rest *".to_string()
                } else {
                    format!("Rest {}", timers.rest)
                }
            } else if state.command.count > 0 {
                format!("Repeat {}", state.command.count)
            } else {
                flag(player.is_searching(), "Searching")
            }
        }
        StatField::Stats => format!("CON {}", player.constitution),
        StatField::Depth => {
            if state.dungeon.in_town() {
                "Town level".to_string()
            } else {
                format!("{} feet", state.dungeon.depth * 50)
            }
        }
        StatField::Experience => format!("Level {} Exp {}", player.level, player.exp),
        StatField::Winner => {
            if state.dungeon.total_winner {
                "*Winner*".to_string()
            } else {
                flag(state.dungeon.wizard, "Wizard")
            }
        }
        StatField::Study => flag(player.status.contains(StatusFlags::STUDY), "Study"),
    }
}

impl Screen for TerminalHost {
    fn print_message(&mut self, text: &str) {
        self.write_line(text, true);
    }

    fn print_line(&mut self, text: &str) {
        self.write_line(text, false);
    }

    fn print_stat(&mut self, field: StatField, state: &GameState) {
        let text = stat_text(field, state);
        match self.dirty.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = text,
            None => self.dirty.push((field, text)),
        }
    }

    fn show_lines(&mut self, lines: &[String]) {
        for line in lines {
            self.write_line(line, true);
        }
    }

    fn flush_output(&mut self) {
        if !self.prompting {
            self.write_status();
        }
        if let Err(err) = self.out.flush() {
            tracing::error!(%err, "terminal flush failed");
        }
    }

    fn bell(&mut self) {
        if let Err(err) = queue!(self.out, Print('\x07')) {
            tracing::error!(%err, "bell failed");
        }
    }
}

impl Keyboard for TerminalHost {
    fn read_key(&mut self) -> Option<Key> {
        if !self.prompting {
            self.write_status();
        }
        loop {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(key) = self.translate(key) {
                        return Some(key);
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(%err, "key read failed");
                    return None;
                }
            }
        }
    }

    fn poll_input(&mut self, timeout_micros: u64) -> bool {
        match event::poll(Duration::from_micros(timeout_micros)) {
            Ok(true) => matches!(event::read(), Ok(Event::Key(key)) if self.translate(key).is_some()),
            Ok(false) => false,
            Err(err) => {
                tracing::error!(%err, "input poll failed");
                false
            }
        }
    }

    fn discard_input(&mut self) {
        while matches!(event::poll(Duration::ZERO), Ok(true)) {
            if event::read().is_err() {
                break;
            }
        }
    }
}

impl World for TerminalHost {
    fn generate_level(&mut self, state: &mut GameState) {
        self.room.generate(state);
    }

    fn restock_stores(&mut self, state: &mut GameState) {
        tracing::debug!(turn = state.dungeon.turn, "stores restocked");
    }

    fn spawn_monster(&mut self, state: &mut GameState) {
        tracing::debug!(turn = state.dungeon.turn, "wandering monster");
    }

    fn teleport_player(&mut self, state: &mut GameState, range: u32) {
        self.room.teleport(state, range);
    }

    fn stairs_here(&self, _state: &GameState) -> Option<Stairs> {
        self.room.stairs_here()
    }

    fn move_player(&mut self, state: &mut GameState, dir: Direction, _pickup: bool) -> ActionResult {
        self.room.move_player(state, dir)
    }

    fn begin_run(&mut self, state: &mut GameState, dir: Direction) -> ActionResult {
        self.room.begin_run(state, dir)
    }

    fn run_step(&mut self, state: &mut GameState) -> bool {
        self.room.run_step(state)
    }

    fn tunnel(&mut self, _state: &mut GameState, dir: Direction) -> ActionResult {
        self.room.tunnel(dir)
    }

    fn perform(&mut self, state: &mut GameState, command: &Command) -> ActionResult {
        match command {
            Command::Version => {
                state.message(format!("moria {}", env!("CARGO_PKG_VERSION")));
                ActionResult::NoTime
            }
            Command::Character => {
                let lines: Vec<String> = [
                    StatField::CurrentHp,
                    StatField::Mana,
                    StatField::ArmorClass,
                    StatField::Experience,
                    StatField::Depth,
                ]
                .into_iter()
                .map(|field| stat_text(field, state))
                .collect();
                self.show_lines(&lines);
                ActionResult::NoTime
            }
            Command::Inventory | Command::Equipment => {
                let carried = state.player.pack.carried().len();
                let worn = state.player.pack.equipment().count();
                state.message(format!("You carry {carried} items and wear {worn}."));
                ActionResult::NoTime
            }
            Command::Look => {
                let (x, y) = self.room.player;
                state.message(format!("You stand at {x},{y}."));
                ActionResult::NoTime
            }
            Command::Search => ActionResult::Success,
            other => {
                tracing::debug!(?other, "command not handled by this world");
                ActionResult::Failed("You cannot do that here.".to_string())
            }
        }
    }
}

impl Persistence for TerminalHost {
    fn save_character(&mut self, state: &GameState) -> bool {
        match save::save_game(state, &self.save_path) {
            Ok(()) => {
                tracing::info!(path = %self.save_path.display(), "character saved");
                true
            }
            Err(err) => {
                tracing::error!(%err, "save failed");
                false
            }
        }
    }
}
