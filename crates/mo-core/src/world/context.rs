//! Dungeon context (where we are and how the session is going)

use serde::{Deserialize, Serialize};

/// Session-wide dungeon state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonContext {
    /// Current depth; 0 is the town
    pub depth: i32,
    /// Deepest depth reached
    pub max_depth: i32,
    /// Global turn counter, never reset
    pub turn: u64,

    // Loop control
    pub new_level: bool,
    pub eof: bool,
    pub saved: bool,
    /// A monster asked for the player to be teleported away
    pub teleport_requested: bool,

    // Character fate
    pub death: bool,
    pub died_from: String,
    pub total_winner: bool,

    // Wizard mode
    pub wizard: bool,
    /// Set once wizard mode has been used; the game no longer scores
    pub noscore: bool,
}

impl DungeonContext {
    pub fn in_town(&self) -> bool {
        self.depth == 0
    }

    /// Record the current depth as visited
    pub fn note_depth(&mut self) {
        if self.depth > self.max_depth {
            self.max_depth = self.depth;
        }
    }

    /// The current level loop must stop
    pub fn level_over(&self) -> bool {
        self.new_level || self.eof || self.saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_depth_keeps_deepest() {
        let mut ctx = DungeonContext { depth: 5, ..Default::default() };
        ctx.note_depth();
        ctx.depth = 2;
        ctx.note_depth();
        assert_eq!(ctx.max_depth, 5);
    }

    #[test]
    fn test_level_over() {
        let mut ctx = DungeonContext::default();
        assert!(!ctx.level_over());
        ctx.eof = true;
        assert!(ctx.level_over());
    }
}
