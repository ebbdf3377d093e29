use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;

use crate::{
    config::{Config, ConfigManager},
    core::{clock::SystemClock, LedgerManager, LoadReport},
    storage::JsonFileStore,
};

use super::core::CliError;
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler can reach.
pub struct ShellContext {
    pub mode: CliMode,
    pub manager: LedgerManager,
    /// Same files the manager writes through; kept for backup commands.
    pub files: JsonFileStore,
    pub theme: ColorfulTheme,
    pub running: bool,
}

impl ShellContext {
    /// Opens the ledger stored under the config manager's base directory.
    pub fn with_config(
        mode: CliMode,
        config_manager: &ConfigManager,
        config: &Config,
    ) -> Result<Self, CliError> {
        let files = JsonFileStore::new(
            config_manager.base_dir().to_path_buf(),
            Some(config.backup_retention),
        )?;
        let (manager, report) =
            LedgerManager::open(Box::new(files.clone()), config, Arc::new(SystemClock))?;

        let context = Self {
            mode,
            manager,
            files,
            theme: ColorfulTheme::default(),
            running: true,
        };
        context.report_load(&report);
        Ok(context)
    }

    pub fn prompt(&self) -> String {
        let store = self.manager.store();
        let account = store
            .selected_account_id()
            .and_then(|id| store.account_name(id))
            .unwrap_or("no account");
        let marker = if self.manager.is_dirty() { "*" } else { "" };
        format!("ledger [{}]{}> ", account, marker)
    }

    pub(crate) fn report_load(&self, report: &LoadReport) {
        if self.mode == CliMode::Script {
            return;
        }
        if report.accounts > 0 || report.pending_ops > 0 {
            output::info(format!(
                "Loaded {} account(s), {} transaction(s), {} pending sync op(s).",
                report.accounts, report.transactions, report.pending_ops
            ));
        }
        if report.corrected_balances > 0 {
            output::warning(format!(
                "{} stored balance(s) disagreed with their transactions and were recomputed.",
                report.corrected_balances
            ));
        }
    }
}
