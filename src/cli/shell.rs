use std::io::{self, BufRead};

use rustyline::{error::ReadlineError, DefaultEditor};

use crate::cli::core::{CliError, LoopControl};
use crate::cli::output;
use crate::cli::shell_context::{CliMode, ShellContext};
use crate::config::ConfigManager;
use crate::utils;

/// Environment variable that switches the shell to reading commands from stdin.
pub const SCRIPT_ENV: &str = "LEDGER_CORE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    utils::init_tracing_with(&config.log_filter);
    if mode == CliMode::Script {
        colored::control::set_override(false);
    }

    let mut context = ShellContext::with_config(mode, &config_manager, &config)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

/// Runs one line and reports its failure. Returns false once the shell should stop.
fn step(context: &mut ShellContext, line: &str) -> bool {
    match context.process_line(line) {
        Ok(LoopControl::Continue) => context.running,
        Ok(LoopControl::Exit) => false,
        Err(err) => {
            context.report_error(err);
            context.running
        }
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline(&context.prompt()) {
            Ok(line) => line,
            // Ctrl-C goes through `exit` so uncommitted changes get the same prompt.
            Err(ReadlineError::Interrupted) => "exit".to_string(),
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);
        if !step(context, line) {
            return Ok(());
        }
    }
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if !step(context, &line?) {
            break;
        }
    }
    Ok(())
}
