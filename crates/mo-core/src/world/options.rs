//! Game options and configuration
//!
//! Options come from an rc file made of `OPTIONS=` lines, each holding a
//! comma separated list of `name`, `!name` / `noname`, or `name:value`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::OptionsError;
use crate::consts::{INTERRUPT_POLL_MICROS, MAX_SAVE_MSG};

/// User-configurable game options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    // Interface options
    pub rogue_like_commands: bool,
    pub sound_beep: bool,
    /// Echo repeat-count digits while they are typed
    pub display_counts: bool,

    // Engine options
    /// How long to wait for an interrupting key during repeats and rests
    pub interrupt_poll_micros: u64,
    pub wizard_allowed: bool,
    pub seed: Option<u64>,
    pub message_history: usize,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            rogue_like_commands: false,
            sound_beep: true,
            display_counts: true,

            interrupt_poll_micros: INTERRUPT_POLL_MICROS,
            wizard_allowed: true,
            seed: None,
            message_history: MAX_SAVE_MSG,
        }
    }
}

impl GameOptions {
    /// Load options from an rc file
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::IoError(e.to_string()))?;

        Self::parse_config(&contents)
    }

    /// Parse options from an rc file's contents
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for line in contents.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(opts) = line.strip_prefix("OPTIONS=") else {
                return Err(OptionsError::ParseError(line.to_string()));
            };
            for opt in opts.split(',').map(str::trim).filter(|o| !o.is_empty()) {
                options.parse_option(opt)?;
            }
        }

        Ok(options)
    }

    /// Parse a single option
    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if let Some((key, value)) = opt.split_once(':').or_else(|| opt.split_once('=')) {
            return self.set_option(key.trim(), Some(value.trim()));
        }

        // Handle negation
        let (negated, name) = if let Some(name) = opt.strip_prefix('!') {
            (true, name)
        } else if let Some(name) = opt.strip_prefix("no") {
            (true, name)
        } else {
            (false, opt)
        };

        self.set_bool_option(name, !negated)
    }

    /// Set a boolean option
    fn set_bool_option(&mut self, name: &str, value: bool) -> Result<(), OptionsError> {
        match name {
            "rogue_like_commands" | "roguelike" => self.rogue_like_commands = value,
            "sound_beep" | "beep" => self.sound_beep = value,
            "display_counts" => self.display_counts = value,
            "wizard_allowed" | "wizard" => self.wizard_allowed = value,
            "interrupt_poll" | "seed" | "message_history" => {
                return Err(OptionsError::MissingValue(name.to_string()));
            }
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Set an option with a value
    fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), OptionsError> {
        let value = value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| OptionsError::MissingValue(name.to_string()))?;
        let invalid = || OptionsError::InvalidValue(name.to_string(), value.to_string());

        match name {
            "interrupt_poll" => self.interrupt_poll_micros = value.parse().map_err(|_| invalid())?,
            "seed" => self.seed = Some(value.parse().map_err(|_| invalid())?),
            "message_history" => {
                let n: usize = value.parse().map_err(|_| invalid())?;
                if n == 0 {
                    return Err(invalid());
                }
                self.message_history = n;
            }
            "rogue_like_commands" | "roguelike" | "sound_beep" | "beep" | "display_counts"
            | "wizard_allowed" | "wizard" => {
                let flag = match value.to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => return Err(invalid()),
                };
                return self.set_bool_option(name, flag);
            }
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}
