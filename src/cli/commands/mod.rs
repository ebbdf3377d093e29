pub mod account;
pub mod data;
pub mod sync;
pub mod system;
pub mod transaction;

use crate::cli::core::{CommandError, CommandResult};
use crate::cli::shell_context::ShellContext;

pub(crate) type Handler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// A top-level shell command. Lookup matches `name` or any of `aliases`.
pub(crate) struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub summary: &'static str,
    pub usage: &'static str,
    pub run: Handler,
}

impl Command {
    fn answers_to(&self, word: &str) -> bool {
        self.name == word || self.aliases.contains(&word)
    }
}

/// Command groups in the order `help` lists them.
static GROUPS: [&[Command]; 5] = [
    account::COMMANDS,
    transaction::COMMANDS,
    sync::COMMANDS,
    data::COMMANDS,
    system::COMMANDS,
];

pub(crate) fn all() -> impl Iterator<Item = &'static Command> {
    GROUPS.iter().flat_map(|group| group.iter())
}

/// `word` must already be lowercase.
pub(crate) fn lookup(word: &str) -> Option<&'static Command> {
    all().find(|command| command.answers_to(word))
}

/// Splits `args` into a subcommand and its arguments.
pub(crate) fn subcommand<'a>(
    args: &'a [&'a str],
    usage: &str,
) -> Result<(String, &'a [&'a str]), CommandError> {
    match args.split_first() {
        Some((name, rest)) => Ok((name.to_lowercase(), rest)),
        None => Err(usage_error(usage)),
    }
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {}", usage))
}

/// Pulls `--flag value` pairs out of `args`, returning the remaining
/// positional arguments.
pub(crate) fn take_flag<'a>(args: &[&'a str], flag: &str) -> (Option<&'a str>, Vec<&'a str>) {
    let mut value = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter().copied();
    while let Some(arg) = iter.next() {
        if arg == flag {
            value = iter.next();
        } else {
            rest.push(arg);
        }
    }
    (value, rest)
}

/// Removes a bare switch such as `--yes`, returning whether it was present.
pub(crate) fn take_switch<'a>(args: &[&'a str], switch: &str) -> (bool, Vec<&'a str>) {
    let present = args.contains(&switch);
    (present, args.iter().copied().filter(|arg| *arg != switch).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_split_from_positionals() {
        let (date, rest) = take_flag(&["expense", "5", "--date", "2024-01-02", "lunch"], "--date");
        assert_eq!(date, Some("2024-01-02"));
        assert_eq!(rest, vec!["expense", "5", "lunch"]);

        let (yes, rest) = take_switch(&["file.json", "--yes"], "--yes");
        assert!(yes);
        assert_eq!(rest, vec!["file.json"]);
    }

    #[test]
    fn names_and_aliases_never_overlap() {
        let mut words: Vec<&str> = all()
            .flat_map(|command| std::iter::once(command.name).chain(command.aliases.iter().copied()))
            .collect();
        let total = words.len();
        words.sort_unstable();
        words.dedup();
        assert_eq!(words.len(), total);
    }

    #[test]
    fn aliases_resolve_to_their_command() {
        assert_eq!(lookup("quit").map(|command| command.name), Some("exit"));
        assert_eq!(lookup("transaction").map(|command| command.name), Some("tx"));
        assert_eq!(lookup("accounts").map(|command| command.name), Some("account"));
        assert!(lookup("Account").is_none());
    }
}
