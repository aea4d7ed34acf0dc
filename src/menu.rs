//! Interactive menu loop.
//!
//! Nine numbered actions (organize / list / dry-run, each against the
//! current, parent, or a typed-in folder) plus exit. Input is read line by
//! line from any [`BufRead`], so the loop runs the same against a terminal
//! or a scripted session.

use crate::cli::{Action, Mode, Session, TargetSelector, run_action};
use crate::output::OutputFormatter;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Menu number that ends the session.
pub const EXIT_CHOICE: u32 = 10;

/// Consecutive invalid inputs tolerated before the session ends.
pub const MAX_INVALID_INPUTS: usize = 5;

const MODES: [Mode; 3] = [Mode::Organize, Mode::List, Mode::DryRun];
const TARGETS: [TargetSelector; 3] = [
    TargetSelector::Current,
    TargetSelector::Parent,
    TargetSelector::Custom,
];

/// Rejected menu input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid choice '{0}'. Please enter a number between 1 and 10.")]
    InvalidChoice(String),
    #[error("No folder path entered.")]
    EmptyPath,
}

/// A parsed menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run(Action),
    Exit,
}

/// Maps menu input to a choice: 1-3 organize, 4-6 list, 7-9 dry run,
/// each as current / parent / specific folder; 10 exits.
pub fn parse_choice(input: &str) -> Result<MenuChoice, InputError> {
    let trimmed = input.trim();
    let number: u32 = trimmed
        .parse()
        .map_err(|_| InputError::InvalidChoice(trimmed.to_string()))?;

    match number {
        EXIT_CHOICE => Ok(MenuChoice::Exit),
        1..=9 => {
            let index = (number - 1) as usize;
            Ok(MenuChoice::Run(Action {
                mode: MODES[index / 3],
                target: TARGETS[index % 3],
            }))
        }
        _ => Err(InputError::InvalidChoice(trimmed.to_string())),
    }
}

/// Cleans a typed-in folder path: trims whitespace and surrounding quotes.
pub fn parse_custom_path(input: &str) -> Result<PathBuf, InputError> {
    let trimmed = input.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        return Err(InputError::EmptyPath);
    }
    Ok(PathBuf::from(unquoted))
}

const MENU_TEXT: &str = "\
============================================
            sortbin - File Menu
============================================
ORGANIZE (MOVE FILES):
  1. In the CURRENT folder
  2. In the PARENT folder
  3. In a SPECIFIC folder

LIST FILES:
  4. In the CURRENT folder
  5. In the PARENT folder
  6. In a SPECIFIC folder

PLAN ORGANIZATION (DRY RUN):
  7. In the CURRENT folder
  8. In the PARENT folder
  9. In a SPECIFIC folder
--------------------------------------------
  10. Exit
============================================";

/// The interactive controller.
pub struct Menu<R: BufRead, W: Write> {
    input: R,
    console: OutputFormatter<W>,
    cwd: PathBuf,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Creates a menu reading from `input`; "current" and "parent" resolve
    /// against `cwd`.
    pub fn new(input: R, console: OutputFormatter<W>, cwd: PathBuf) -> Self {
        Self {
            input,
            console,
            cwd,
        }
    }

    /// Returns the console writer, consuming the menu.
    pub fn into_console(self) -> OutputFormatter<W> {
        self.console
    }

    /// Reads one line. `None` on end of input or a read error.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                self.console.error(&format!("Could not read input: {}", e));
                None
            }
        }
    }

    /// Runs the menu until exit, end of input, or too many invalid inputs.
    pub fn run(&mut self, session: &mut Session) {
        let mut invalid_streak = 0;

        loop {
            self.console.plain(MENU_TEXT);
            self.console
                .prompt(&format!("Enter your choice (1-{}): ", EXIT_CHOICE));

            let Some(line) = self.read_line() else {
                self.console.plain("");
                self.console.info("End of input. Exiting.");
                break;
            };

            let action = match parse_choice(&line) {
                Ok(MenuChoice::Exit) => {
                    self.console.info("Exiting.");
                    break;
                }
                Ok(MenuChoice::Run(action)) => action,
                Err(e) => {
                    self.console.warning(&e.to_string());
                    session.log.warning(&e.to_string());
                    if self.give_up(&mut invalid_streak) {
                        break;
                    }
                    continue;
                }
            };

            let target = match action.target.fixed_path(&self.cwd) {
                Some(path) => path,
                None => {
                    self.console
                        .prompt("Enter the full path to the specific folder: ");
                    let Some(line) = self.read_line() else {
                        self.console.plain("");
                        self.console.info("End of input. Exiting.");
                        break;
                    };
                    match parse_custom_path(&line) {
                        Ok(path) => path,
                        Err(e) => {
                            self.console
                                .warning(&format!("{} Returning to main menu.", e));
                            if self.give_up(&mut invalid_streak) {
                                break;
                            }
                            continue;
                        }
                    }
                }
            };

            match run_action(session, action.mode, &target, &mut self.console) {
                Ok(_) => invalid_streak = 0,
                Err(e) => {
                    self.console
                        .error(&format!("{} Returning to main menu.", e));
                    // A typed-in folder that cannot be used is bad input
                    if action.target == TargetSelector::Custom
                        && self.give_up(&mut invalid_streak)
                    {
                        break;
                    }
                }
            }
        }
    }

    /// Counts one invalid input; true once the limit is reached.
    fn give_up(&mut self, invalid_streak: &mut usize) -> bool {
        *invalid_streak += 1;
        if *invalid_streak >= MAX_INVALID_INPUTS {
            self.console
                .error("Too many invalid inputs in a row. Exiting.");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice_maps_every_action() {
        let expected = [
            (Mode::Organize, TargetSelector::Current),
            (Mode::Organize, TargetSelector::Parent),
            (Mode::Organize, TargetSelector::Custom),
            (Mode::List, TargetSelector::Current),
            (Mode::List, TargetSelector::Parent),
            (Mode::List, TargetSelector::Custom),
            (Mode::DryRun, TargetSelector::Current),
            (Mode::DryRun, TargetSelector::Parent),
            (Mode::DryRun, TargetSelector::Custom),
        ];
        for (i, (mode, target)) in expected.into_iter().enumerate() {
            let input = format!("{}\n", i + 1);
            assert_eq!(
                parse_choice(&input),
                Ok(MenuChoice::Run(Action { mode, target }))
            );
        }
    }

    #[test]
    fn test_parse_choice_exit() {
        assert_eq!(parse_choice(" 10 "), Ok(MenuChoice::Exit));
    }

    #[test]
    fn test_parse_choice_rejects_invalid_input() {
        for input in ["0", "11", "abc", "", "-1", "1.5"] {
            assert!(
                matches!(parse_choice(input), Err(InputError::InvalidChoice(_))),
                "input {:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_custom_path_strips_quotes() {
        assert_eq!(
            parse_custom_path("  \"/tmp/my files\"  \n"),
            Ok(PathBuf::from("/tmp/my files"))
        );
        assert_eq!(
            parse_custom_path("'/srv/data'"),
            Ok(PathBuf::from("/srv/data"))
        );
        assert_eq!(parse_custom_path("/plain"), Ok(PathBuf::from("/plain")));
    }

    #[test]
    fn test_parse_custom_path_rejects_blank() {
        assert_eq!(parse_custom_path("   \n"), Err(InputError::EmptyPath));
        assert_eq!(parse_custom_path("\"\""), Err(InputError::EmptyPath));
    }
}
