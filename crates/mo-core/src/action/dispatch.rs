//! Running decoded commands
//!
//! The engine handles commands that only touch the turn state (stairs,
//! resting, searching, lamp refills, session and wizard commands) and hands
//! the rest to the world collaborator.

use super::{ActionResult, Command, Direction, RestLength, WizardCommand};
use crate::consts::{
    LAMP_SUBVAL, MAX_SHORT, MAX_WIZARD_DEPTH, OBJ_LAMP_MAX, TV_FLASK, WIZARD_TELEPORT_RANGE,
};
use crate::gameloop::GameState;
use crate::interface::{Host, Request, Stairs, StatField, deliver};
use crate::object::EquipSlot;
use crate::player::Condition;
use crate::world::{RestRefusal, end_find, search_off, search_on, start_rest};

/// Run a command and record whether it took game time
///
/// Free commands never advance the clock; other commands are free when
/// their handler did nothing. The command becomes the last command.
pub fn dispatch<H: Host + ?Sized>(state: &mut GameState, host: &mut H, command: Command) {
    let result = execute(state, host, &command);
    if command.is_free() || !result.took_time() {
        state.command.free_turn = true;
    }
    tracing::trace!(?command, ?result, free = state.command.free_turn, "dispatched");
    if let ActionResult::Failed(message) = result {
        state.message(message);
    }
    state.command.last = Some(command);
}

fn execute<H: Host + ?Sized>(state: &mut GameState, host: &mut H, command: &Command) -> ActionResult {
    match command {
        Command::Quit { confirmed } => {
            if *confirmed {
                quit(state);
            }
            ActionResult::NoTime
        }
        Command::PreviousMessage => previous_message(state, host),
        Command::ToggleWizard { confirmed } => toggle_wizard(state, *confirmed),
        Command::SaveAndExit => save_and_exit(state, host),
        Command::Nothing => ActionResult::NoTime,

        Command::Move { dir, pickup } => host.move_player(state, *dir, *pickup),
        Command::Run(dir) => run(state, host, *dir),
        Command::Stay => stay(state, host),
        Command::GoUp => take_stairs(state, host, Stairs::Up),
        Command::GoDown => take_stairs(state, host, Stairs::Down),
        Command::Rest(length) => rest(state, *length),
        Command::Tunnel(dir) => host.tunnel(state, *dir),
        Command::ToggleSearch => {
            if state.player.is_searching() {
                search_off(state);
            } else {
                search_on(state);
            }
            ActionResult::NoTime
        }
        Command::RefillLamp => refill_lamp(state),

        Command::Wizard(wizard) => {
            if state.dungeon.wizard {
                wizard_command(state, host, *wizard)
            } else {
                host.print_line("Type '?' for help.");
                ActionResult::NoTime
            }
        }
        Command::Unknown(_) => {
            host.print_line(unknown_key_hint(state));
            ActionResult::NoTime
        }

        other => host.perform(state, other),
    }
}

fn unknown_key_hint(state: &GameState) -> &'static str {
    match (state.dungeon.wizard, state.options.rogue_like_commands) {
        (false, _) => "Type '?' for help.",
        (true, true) => "Type '?' or '\\' for help.",
        (true, false) => "Type '?' or ^H for help.",
    }
}

fn quit(state: &mut GameState) {
    state.dungeon.death = true;
    state.dungeon.new_level = true;
    state.dungeon.died_from = "Quitting".to_string();
    tracing::info!("player quit");
}

/// `^P`: the last message, or with a count (or a second `^P`) a page of
/// history
fn previous_message<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> ActionResult {
    let history = state.messages.capacity();
    let count = state.command.count;
    let lines = if count > 0 {
        state.command.count = 0;
        usize::try_from(count).unwrap_or(history).min(history)
    } else if state.command.last == Some(Command::PreviousMessage) {
        history
    } else {
        1
    };

    if lines > 1 {
        host.show_lines(&state.messages.recent(lines));
    } else {
        let last = state.messages.last().unwrap_or_default();
        host.print_line(&format!(">{last}"));
    }
    ActionResult::NoTime
}

fn toggle_wizard(state: &mut GameState, confirmed: bool) -> ActionResult {
    if state.dungeon.wizard {
        state.dungeon.wizard = false;
        state.message("Wizard mode off.");
    } else if !state.options.wizard_allowed {
        state.message("Wizard mode is not available.");
    } else if confirmed {
        state.dungeon.noscore = true;
        state.dungeon.wizard = true;
        state.message("Wizard mode on.");
    }
    tracing::info!(wizard = state.dungeon.wizard, "wizard mode");
    state.request(Request::Stat(StatField::Winner));
    ActionResult::NoTime
}

fn save_and_exit<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> ActionResult {
    if state.dungeon.total_winner {
        state.message("You are a Total Winner,  your character must be retired.");
        if state.options.rogue_like_commands {
            state.message("Use 'Q' to when you are ready to quit.");
        } else {
            state.message("Use <Control>-K when you are ready to quit.");
        }
        return ActionResult::NoTime;
    }

    state.dungeon.died_from = "(saved)".to_string();
    state.message("Saving game...");
    deliver(state, host);
    if host.save_character(state) {
        state.dungeon.saved = true;
        tracing::info!(turn = state.dungeon.turn, "game saved");
    } else {
        tracing::error!("save failed");
        state.dungeon.died_from = "(alive and well)".to_string();
    }
    ActionResult::NoTime
}

fn run<H: Host + ?Sized>(state: &mut GameState, host: &mut H, dir: Direction) -> ActionResult {
    state.command.find = true;
    let result = host.begin_run(state, dir);
    if !result.took_time() {
        end_find(state);
    }
    result
}

/// Hold still; with a count, rest for the remainder
fn stay<H: Host + ?Sized>(state: &mut GameState, host: &mut H) -> ActionResult {
    host.stay_in_place(state);
    if state.command.count > 1 {
        state.command.count -= 1;
        let turns = state.command.count;
        rest(state, RestLength::Turns(turns));
    }
    ActionResult::Success
}

fn take_stairs<H: Host + ?Sized>(state: &mut GameState, host: &mut H, wanted: Stairs) -> ActionResult {
    if host.stairs_here(state) != Some(wanted) {
        let which = match wanted {
            Stairs::Up => "up",
            Stairs::Down => "down",
        };
        return ActionResult::Failed(format!("I see no {which} staircase here."));
    }

    match wanted {
        Stairs::Up => {
            state.dungeon.depth -= 1;
            state.message("You enter a maze of up staircases.");
        }
        Stairs::Down => {
            state.dungeon.depth += 1;
            state.message("You enter a maze of down staircases.");
        }
    }
    state.message("You pass through a one-way door.");
    state.dungeon.new_level = true;
    tracing::debug!(depth = state.dungeon.depth, "took stairs");
    ActionResult::Success
}

fn rest(state: &mut GameState, length: RestLength) -> ActionResult {
    let turns = match length {
        RestLength::Turns(turns) => turns,
        RestLength::UntilDone => -MAX_SHORT,
    };
    state.command.count = 0;
    match start_rest(state, turns) {
        Ok(()) => ActionResult::Success,
        Err(RestRefusal::Empty) => ActionResult::NoTime,
        Err(RestRefusal::Invalid) => ActionResult::Failed("Invalid rest count.".to_string()),
    }
}

/// Pour a flask of oil into the lamp
fn refill_lamp(state: &mut GameState) -> ActionResult {
    let using_lamp = state
        .player
        .pack
        .worn(EquipSlot::Light)
        .is_some_and(|light| light.subval == LAMP_SUBVAL);
    if !using_lamp {
        return ActionResult::Failed("But you are not using a lamp.".to_string());
    }
    let Some(index) = state.player.pack.find_category(TV_FLASK) else {
        return ActionResult::Failed("You have no oil.".to_string());
    };

    let oil = state.player.pack.carried()[index].pval;
    let Some(lamp) = state.player.pack.worn_mut(EquipSlot::Light) else {
        return ActionResult::Failed("But you are not using a lamp.".to_string());
    };
    lamp.pval += oil;
    let fuel = lamp.pval;
    if fuel > OBJ_LAMP_MAX {
        lamp.pval = OBJ_LAMP_MAX;
        state.message("Your lamp overflows, spilling oil on the ground.");
        state.message("Your lamp is full.");
    } else if fuel > OBJ_LAMP_MAX / 2 {
        state.message("Your lamp is more than half full.");
    } else if fuel == OBJ_LAMP_MAX / 2 {
        state.message("Your lamp is half full.");
    } else {
        state.message("Your lamp is less than half full.");
    }

    let remaining = state.player.pack.carried()[index].quantity.saturating_sub(1);
    state.message(match remaining {
        0 => "You have no more flasks of oil.".to_string(),
        1 => "You have a flask of oil.".to_string(),
        n => format!("You have {n} flasks of oil."),
    });
    state.player.pack.remove_one(index);
    ActionResult::Success
}

fn wizard_command<H: Host + ?Sized>(
    state: &mut GameState,
    host: &mut H,
    command: WizardCommand,
) -> ActionResult {
    tracing::debug!(%command, "wizard command");
    match command {
        WizardCommand::CureAll => {
            state.player.pack.remove_curses();
            let timers = &mut state.player.timers;
            for condition in [
                Condition::Blind,
                Condition::Confused,
                Condition::Poisoned,
                Condition::Afraid,
                Condition::Slow,
                Condition::Hallucinating,
            ] {
                timers.cure(condition);
            }
            state.request(Request::Stat(StatField::Stats));
            ActionResult::NoTime
        }
        WizardCommand::GoToLevel(Some(level)) if level >= 0 => {
            state.dungeon.depth = level.min(MAX_WIZARD_DEPTH);
            state.dungeon.new_level = true;
            ActionResult::NoTime
        }
        WizardCommand::GoToLevel(_) => ActionResult::NoTime,
        WizardCommand::Teleport => {
            host.teleport_player(state, WIZARD_TELEPORT_RANGE);
            ActionResult::NoTime
        }
        WizardCommand::GainExperience => {
            let count = std::mem::take(&mut state.command.count);
            let exp = &mut state.player.exp;
            *exp = if count > 0 {
                i64::from(count)
            } else if *exp == 0 {
                1
            } else {
                *exp * 2
            };
            state.request(Request::Stat(StatField::Experience));
            ActionResult::NoTime
        }
        other => {
            let result = host.perform(state, &Command::Wizard(other));
            state.command.count = 0;
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameRng;
    use crate::interface::{Key, Keyboard, Persistence, Screen, World};
    use crate::object::Item;

    #[derive(Default)]
    struct Stub {
        stairs: Option<Stairs>,
        blocked: bool,
        save_ok: bool,
        saves: usize,
        lines: Vec<String>,
        shown: Vec<String>,
        performed: Vec<Command>,
        teleports: Vec<u32>,
    }

    impl Screen for Stub {
        fn print_message(&mut self, _text: &str) {}
        fn print_line(&mut self, text: &str) {
            self.lines.push(text.to_string());
        }
        fn print_stat(&mut self, _field: StatField, _state: &GameState) {}
        fn show_lines(&mut self, lines: &[String]) {
            self.shown = lines.to_vec();
        }
    }

    impl Keyboard for Stub {
        fn read_key(&mut self) -> Option<Key> {
            None
        }
        fn poll_input(&mut self, _timeout_micros: u64) -> bool {
            false
        }
    }

    impl World for Stub {
        fn move_player(&mut self, _: &mut GameState, _: Direction, _: bool) -> ActionResult {
            if self.blocked {
                ActionResult::NoTime
            } else {
                ActionResult::Success
            }
        }
        fn stairs_here(&self, _state: &GameState) -> Option<Stairs> {
            self.stairs
        }
        fn teleport_player(&mut self, _state: &mut GameState, range: u32) {
            self.teleports.push(range);
        }
        fn perform(&mut self, _state: &mut GameState, command: &Command) -> ActionResult {
            self.performed.push(command.clone());
            ActionResult::Success
        }
    }

    impl Persistence for Stub {
        fn save_character(&mut self, _state: &GameState) -> bool {
            self.saves += 1;
            self.save_ok
        }
    }

    fn state() -> GameState {
        GameState::new(GameRng::new(4))
    }

    fn last_message(state: &GameState) -> Option<&str> {
        state.messages.last()
    }

    #[test]
    fn test_move_takes_a_turn() {
        let mut state = state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::Move { dir: Direction::East, pickup: true });
        assert!(!state.command.free_turn);
        assert_eq!(
            state.command.last,
            Some(Command::Move { dir: Direction::East, pickup: true })
        );
    }

    #[test]
    fn test_blocked_move_is_free() {
        let mut state = state();
        let mut host = Stub { blocked: true, ..Stub::default() };
        dispatch(&mut state, &mut host, Command::Move { dir: Direction::East, pickup: true });
        assert!(state.command.free_turn);
    }

    #[test]
    fn test_free_command_stays_free_even_if_handled() {
        let mut state = state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::Look);
        assert!(state.command.free_turn);
        assert_eq!(host.performed, vec![Command::Look]);
    }

    #[test]
    fn test_stairs() {
        let mut state = state();
        state.dungeon.depth = 3;
        let mut host = Stub { stairs: Some(Stairs::Down), ..Stub::default() };
        dispatch(&mut state, &mut host, Command::GoUp);
        assert!(state.command.free_turn);
        assert_eq!(last_message(&state), Some("I see no up staircase here."));
        assert_eq!(state.dungeon.depth, 3);

        state.command.free_turn = false;
        dispatch(&mut state, &mut host, Command::GoDown);
        assert!(!state.command.free_turn);
        assert_eq!(state.dungeon.depth, 4);
        assert!(state.dungeon.new_level);
        assert_eq!(last_message(&state), Some("You pass through a one-way door."));
    }

    #[test]
    fn test_quit() {
        let mut state = state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::Quit { confirmed: false });
        assert!(!state.dungeon.death);
        dispatch(&mut state, &mut host, Command::Quit { confirmed: true });
        assert!(state.dungeon.death);
        assert!(state.dungeon.new_level);
        assert_eq!(state.dungeon.died_from, "Quitting");
    }

    #[test]
    fn test_previous_message_grows_on_repeat() {
        let mut state = state();
        let mut host = Stub::default();
        for n in 0..5 {
            state.message(format!("m{n}"));
        }
        dispatch(&mut state, &mut host, Command::PreviousMessage);
        assert_eq!(host.lines.last().map(String::as_str), Some(">m4"));
        assert!(host.shown.is_empty());

        dispatch(&mut state, &mut host, Command::PreviousMessage);
        assert_eq!(host.shown, vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[test]
    fn test_previous_message_with_count() {
        let mut state = state();
        let mut host = Stub::default();
        for n in 0..5 {
            state.message(format!("m{n}"));
        }
        state.command.count = 2;
        dispatch(&mut state, &mut host, Command::PreviousMessage);
        assert_eq!(host.shown, vec!["m3", "m4"]);
        assert_eq!(state.command.count, 0);
    }

    #[test]
    fn test_wizard_toggle() {
        let mut state = state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::ToggleWizard { confirmed: false });
        assert!(!state.dungeon.wizard);
        dispatch(&mut state, &mut host, Command::ToggleWizard { confirmed: true });
        assert!(state.dungeon.wizard);
        assert!(state.dungeon.noscore);
        dispatch(&mut state, &mut host, Command::ToggleWizard { confirmed: true });
        assert!(!state.dungeon.wizard);
        assert_eq!(last_message(&state), Some("Wizard mode off."));
        assert!(state.requests.contains(&Request::Stat(StatField::Winner)));
    }

    #[test]
    fn test_wizard_commands_need_wizard_mode() {
        let mut state = state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::Wizard(WizardCommand::Teleport));
        assert!(host.teleports.is_empty());
        assert_eq!(host.lines, vec!["Type '?' for help."]);
        assert!(state.command.free_turn);

        state.dungeon.wizard = true;
        dispatch(&mut state, &mut host, Command::Wizard(WizardCommand::Teleport));
        assert_eq!(host.teleports, vec![100]);
    }

    #[test]
    fn test_unknown_key_hint() {
        let mut state = state();
        let mut host = Stub::default();
        state.dungeon.wizard = true;
        state.options.rogue_like_commands = true;
        dispatch(&mut state, &mut host, Command::Unknown(Key(b'~')));
        assert_eq!(host.lines, vec!["Type '?' or '\\' for help."]);
    }

    #[test]
    fn test_save_and_exit() {
        let mut state = state();
        let mut host = Stub { save_ok: true, ..Stub::default() };
        dispatch(&mut state, &mut host, Command::SaveAndExit);
        assert!(state.dungeon.saved);
        assert!(state.dungeon.level_over());
        assert_eq!(state.dungeon.died_from, "(saved)");

        let mut state = self::state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::SaveAndExit);
        assert!(!state.dungeon.saved);
        assert_eq!(state.dungeon.died_from, "(alive and well)");
    }

    #[test]
    fn test_total_winner_cannot_save() {
        let mut state = state();
        state.dungeon.total_winner = true;
        let mut host = Stub { save_ok: true, ..Stub::default() };
        dispatch(&mut state, &mut host, Command::SaveAndExit);
        assert_eq!(host.saves, 0);
        assert_eq!(
            last_message(&state),
            Some("Use <Control>-K when you are ready to quit.")
        );
    }

    #[test]
    fn test_rest_validation() {
        let mut state = state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::Rest(RestLength::Turns(0)));
        assert!(state.command.free_turn);
        assert!(state.messages.is_empty());

        state.command.free_turn = false;
        dispatch(&mut state, &mut host, Command::Rest(RestLength::Turns(-4)));
        assert!(state.command.free_turn);
        assert_eq!(last_message(&state), Some("Invalid rest count."));

        state.command.free_turn = false;
        dispatch(&mut state, &mut host, Command::Rest(RestLength::UntilDone));
        assert!(!state.command.free_turn);
        assert_eq!(state.player.timers.rest, -MAX_SHORT);
    }

    #[test]
    fn test_stay_with_count_rests() {
        let mut state = state();
        let mut host = Stub::default();
        state.command.count = 5;
        dispatch(&mut state, &mut host, Command::Stay);
        assert!(!state.command.free_turn);
        assert_eq!(state.player.timers.rest, 4);
        assert_eq!(state.command.count, 0);
    }

    #[test]
    fn test_run_into_wall_ends_find() {
        let mut state = state();
        let mut host = Stub { blocked: true, ..Stub::default() };
        dispatch(&mut state, &mut host, Command::Run(Direction::North));
        assert!(!state.command.find);
        assert!(state.command.free_turn);

        let mut host = Stub::default();
        state.command.free_turn = false;
        dispatch(&mut state, &mut host, Command::Run(Direction::North));
        assert!(state.command.find);
    }

    #[test]
    fn test_refill_lamp() {
        let mut state = state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::RefillLamp);
        assert_eq!(last_message(&state), Some("But you are not using a lamp."));

        state.player.pack.equip(EquipSlot::Light, Item::light(LAMP_SUBVAL, 10_000));
        dispatch(&mut state, &mut host, Command::RefillLamp);
        assert_eq!(last_message(&state), Some("You have no oil."));
        assert!(state.command.free_turn);

        state.player.pack.carry(Item::oil_flasks(2, 7500)).unwrap();
        state.command.free_turn = false;
        dispatch(&mut state, &mut host, Command::RefillLamp);
        assert!(!state.command.free_turn);
        assert_eq!(state.player.pack.light_fuel(), OBJ_LAMP_MAX);
        assert_eq!(state.messages.recent(2), vec!["Your lamp is full.", "You have a flask of oil."]);
        assert_eq!(state.player.pack.carried()[0].quantity, 1);

        state.player.pack.worn_mut(EquipSlot::Light).unwrap().pval = 0;
        dispatch(&mut state, &mut host, Command::RefillLamp);
        assert_eq!(state.player.pack.light_fuel(), 7500);
        assert_eq!(
            state.messages.recent(2),
            vec!["Your lamp is half full.", "You have no more flasks of oil."]
        );
        assert!(state.player.pack.carried().is_empty());
    }

    #[test]
    fn test_torch_cannot_be_refilled() {
        let mut state = state();
        let mut host = Stub::default();
        state.player.pack.equip(EquipSlot::Light, Item::light(1, 2000));
        state.player.pack.carry(Item::oil_flasks(1, 7500)).unwrap();
        dispatch(&mut state, &mut host, Command::RefillLamp);
        assert_eq!(last_message(&state), Some("But you are not using a lamp."));
        assert_eq!(state.player.pack.carried().len(), 1);
    }

    #[test]
    fn test_wizard_cure_all() {
        let mut state = state();
        let mut host = Stub::default();
        state.dungeon.wizard = true;
        state.player.timers.blind = 40;
        state.player.timers.poisoned = 9;
        state.player.timers.slow = 1;
        dispatch(&mut state, &mut host, Command::Wizard(WizardCommand::CureAll));
        assert_eq!(state.player.timers.blind, 1);
        assert_eq!(state.player.timers.poisoned, 1);
        assert_eq!(state.player.timers.slow, 1);
    }

    #[test]
    fn test_wizard_go_to_level_caps_depth() {
        let mut state = state();
        let mut host = Stub::default();
        state.dungeon.wizard = true;
        dispatch(&mut state, &mut host, Command::Wizard(WizardCommand::GoToLevel(Some(250))));
        assert_eq!(state.dungeon.depth, 99);
        assert!(state.dungeon.new_level);
    }

    #[test]
    fn test_wizard_experience() {
        let mut state = state();
        let mut host = Stub::default();
        state.dungeon.wizard = true;
        let gain = Command::Wizard(WizardCommand::GainExperience);
        dispatch(&mut state, &mut host, gain.clone());
        assert_eq!(state.player.exp, 1);
        dispatch(&mut state, &mut host, gain.clone());
        assert_eq!(state.player.exp, 2);
        state.command.count = 40;
        dispatch(&mut state, &mut host, gain);
        assert_eq!(state.player.exp, 40);
        assert_eq!(state.command.count, 0);
    }

    #[test]
    fn test_search_toggle_is_free() {
        let mut state = state();
        let mut host = Stub::default();
        dispatch(&mut state, &mut host, Command::ToggleSearch);
        assert!(state.player.is_searching());
        assert!(state.command.free_turn);
        dispatch(&mut state, &mut host, Command::ToggleSearch);
        assert!(!state.player.is_searching());
    }
}
