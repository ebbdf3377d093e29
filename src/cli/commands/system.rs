use crate::cli::core::{CommandError, CommandResult};
use crate::cli::output::{self, render_table, section};
use crate::cli::shell_context::{CliMode, ShellContext};
use crate::storage::CURRENT_SCHEMA_VERSION;
use crate::utils::build_info;

use super::Command;

pub(super) const COMMANDS: &[Command] = &[
    Command {
        name: "version",
        aliases: &[],
        summary: "Show build metadata",
        usage: "version",
        run: cmd_version,
    },
    Command {
        name: "help",
        aliases: &[],
        summary: "Show available commands",
        usage: "help [command]",
        run: cmd_help,
    },
    Command {
        name: "exit",
        aliases: &["quit"],
        summary: "Exit the shell",
        usage: "exit",
        run: cmd_exit,
    },
];

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    println!("{}", meta);
    println!("  schema:   v{}", CURRENT_SCHEMA_VERSION);
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match super::lookup(&name.to_lowercase()) {
            Some(command) => {
                section(command.name);
                println!("{}", command.summary);
                println!("usage: {}", command.usage);
                if !command.aliases.is_empty() {
                    println!("aliases: {}", command.aliases.join(", "));
                }
            }
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = super::all()
        .map(|command| vec![command.name.to_string(), command.summary.to_string()])
        .collect();
    section("Commands");
    println!("{}", render_table(&["Command", "Description"], &rows));
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.manager.is_dirty() {
        match context.mode {
            CliMode::Interactive => {
                if context.confirm("Commit pending changes before exiting?", true)? {
                    let receipt = context.manager.commit()?;
                    output::success(format!("Committed revision {}.", receipt.revision));
                }
            }
            CliMode::Script => {
                output::warning("Exiting with uncommitted changes; they were not saved.")
            }
        }
    }
    Err(CommandError::ExitRequested)
}
