//! Dispatch, error types, and argument helpers shared by every command.

use std::io;

use chrono::NaiveDate;
use dialoguer::Confirm;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use uuid::Uuid;

use crate::cli::{commands, output};
use crate::cli::shell_context::{CliMode, ShellContext};
use crate::domain::{Account, Direction, OwnedEntity, Transaction};
use crate::errors::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Failure that ends the shell.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

/// Failure of one command; reported and the shell keeps going.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No account selected. Use `account add` or `account select` first.")]
    NoAccountSelected,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Core(LedgerError::Io(err))
    }
}

impl ShellContext {
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(entry) = commands::lookup(command) {
            match (entry.run)(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match shell_words::split(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(format!("Could not parse `{}`: {}", line.trim(), err));
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        if raw.starts_with('#') {
            return Ok(LoopControl::Continue);
        }

        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = commands::all()
            .map(|entry| (levenshtein(entry.name, &needle), entry.name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }

    /// Asks before destructive steps. Script mode answers with `default`.
    pub(crate) fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(default);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(CommandError::from)
    }

    pub(crate) fn selected_account(&self) -> Result<&Account, CommandError> {
        let store = self.manager.store();
        store
            .selected_account_id()
            .and_then(|id| store.account(id))
            .ok_or(CommandError::NoAccountSelected)
    }

    /// Finds one of the current owner's accounts by id, id prefix, or name.
    pub(crate) fn resolve_account(&self, reference: &str) -> Result<Uuid, CommandError> {
        let owner = self.manager.owner_id();
        let accounts = self.manager.store().accounts_by_owner(owner);
        resolve_reference(reference, &accounts, |account| account.id, |account| {
            Some(account.name.as_str())
        })
        .map_err(|reason| CommandError::InvalidArguments(format!("account `{reference}` {reason}")))
    }

    pub(crate) fn resolve_transaction(&self, reference: &str) -> Result<Uuid, CommandError> {
        let owner = self.manager.owner_id();
        let transactions: Vec<&Transaction> = self
            .manager
            .store()
            .transactions()
            .iter()
            .filter(|txn| txn.is_owned_by(owner))
            .collect();
        resolve_reference(reference, &transactions, |txn| txn.id, |_| None).map_err(|reason| {
            CommandError::InvalidArguments(format!("transaction `{reference}` {reason}"))
        })
    }
}

fn resolve_reference<T>(
    reference: &str,
    items: &[&T],
    id_of: impl Fn(&T) -> Uuid,
    name_of: impl Fn(&T) -> Option<&str>,
) -> Result<Uuid, &'static str> {
    let needle = reference.trim().to_lowercase();
    if needle.is_empty() {
        return Err("is empty");
    }
    if let Ok(id) = Uuid::parse_str(&needle) {
        return items
            .iter()
            .map(|item| id_of(*item))
            .find(|candidate| *candidate == id)
            .ok_or("was not found");
    }

    let by_name: Vec<Uuid> = items
        .iter()
        .copied()
        .filter(|item| name_of(*item).map_or(false, |name| name.to_lowercase() == needle))
        .map(|item| id_of(item))
        .collect();
    if let [id] = by_name.as_slice() {
        return Ok(*id);
    }

    let by_prefix: Vec<Uuid> = items
        .iter()
        .map(|item| id_of(*item))
        .filter(|id| id.simple().to_string().starts_with(&needle))
        .collect();
    match (by_name.len(), by_prefix.as_slice()) {
        (0, [id]) => Ok(*id),
        (0, []) => Err("was not found"),
        _ => Err("is ambiguous"),
    }
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let amount: f64 = input
        .trim()
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))?;
    if !amount.is_finite() {
        return Err(CommandError::InvalidArguments(format!(
            "amount `{}` must be a finite number",
            input
        )));
    }
    Ok(amount.abs())
}

pub(crate) fn parse_direction(input: &str) -> Result<Direction, CommandError> {
    Direction::parse(input).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "invalid direction `{}` (use income or expense)",
            input
        ))
    })
}
