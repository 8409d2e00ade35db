//! A single walled room standing in for the dungeon
//!
//! Enough geometry to exercise movement, running, stairs and teleport
//! without a map generator.

use mo_core::GameState;
use mo_core::action::{ActionResult, Direction};
use mo_core::interface::Stairs;

const WIDTH: i32 = 20;
const HEIGHT: i32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub player: (i32, i32),
    up: Option<(i32, i32)>,
    down: (i32, i32),
    running: Option<Direction>,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            player: (WIDTH / 2, HEIGHT / 2),
            up: None,
            down: (WIDTH - 2, HEIGHT - 2),
            running: None,
        }
    }
}

impl Room {
    /// Lay out the room for the current depth; the town has no up staircase
    pub fn generate(&mut self, state: &mut GameState) {
        *self = Self {
            up: (!state.dungeon.in_town()).then_some((1, 1)),
            ..Self::default()
        };
        tracing::debug!(depth = state.dungeon.depth, "generated room");
    }

    fn inside(pos: (i32, i32)) -> bool {
        (0..WIDTH).contains(&pos.0) && (0..HEIGHT).contains(&pos.1)
    }

    fn step(pos: (i32, i32), dir: Direction) -> (i32, i32) {
        let (dx, dy) = dir.delta();
        (pos.0 + i32::from(dx), pos.1 + i32::from(dy))
    }

    pub fn stairs_here(&self) -> Option<Stairs> {
        if Some(self.player) == self.up {
            Some(Stairs::Up)
        } else if self.player == self.down {
            Some(Stairs::Down)
        } else {
            None
        }
    }

    pub fn move_player(&mut self, state: &mut GameState, dir: Direction) -> ActionResult {
        let target = Self::step(self.player, dir);
        if !Self::inside(target) {
            if !state.command.find {
                state.message("There is a wall in the way.");
            }
            return ActionResult::NoTime;
        }
        self.player = target;
        ActionResult::Success
    }

    pub fn begin_run(&mut self, state: &mut GameState, dir: Direction) -> ActionResult {
        self.running = Some(dir);
        self.move_player(state, dir)
    }

    /// Keep running until a wall or a staircase
    pub fn run_step(&mut self, state: &mut GameState) -> bool {
        let Some(dir) = self.running else {
            return false;
        };
        if self.stairs_here().is_some() {
            self.running = None;
            return false;
        }
        let moved = self.move_player(state, dir).took_time();
        if !moved {
            self.running = None;
        }
        moved
    }

    pub fn tunnel(&self, dir: Direction) -> ActionResult {
        if Self::inside(Self::step(self.player, dir)) {
            ActionResult::Failed("You tunnel into the air.".to_string())
        } else {
            ActionResult::Failed("This seems to be permanent rock.".to_string())
        }
    }

    /// Jump to a random square within `range` of the player
    pub fn teleport(&mut self, state: &mut GameState, range: u32) {
        let span = range.min(WIDTH as u32) as i32;
        let roll = |state: &mut GameState| state.rng.randint(2 * span as u32 + 1) as i32 - span - 1;
        let x = (self.player.0 + roll(state)).clamp(0, WIDTH - 1);
        let y = (self.player.1 + roll(state)).clamp(0, HEIGHT - 1);
        self.player = (x, y);
        self.running = None;
        tracing::debug!(x, y, range, "teleported");
    }
}
