//! Interactive and scripted shell over [`LedgerManager`](crate::core::LedgerManager).

pub mod commands;
pub mod core;
pub mod output;
mod shell;
pub mod shell_context;

pub use self::core::{CliError, CommandError};
pub use shell::{run_cli, SCRIPT_ENV};
pub use shell_context::{CliMode, ShellContext};
