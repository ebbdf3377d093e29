use std::fs;
use std::path::Path;

use crate::cli::core::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::shell_context::{CliMode, ShellContext};
use crate::core::ImportConfirmation;
use crate::domain::UserProfile;
use crate::errors::LedgerError;
use crate::migration::{migrate_blob, LegacyBlob, MigrationOptions};

use super::{subcommand, take_switch, usage_error, Command};

const BACKUP_USAGE: &str = "backup <create [note]|list|restore <name>>";

pub(super) const COMMANDS: &[Command] = &[
    Command {
        name: "export",
        aliases: &[],
        summary: "Write the current user's accounts and transactions to a file",
        usage: "export <path> [display name]",
        run: cmd_export,
    },
    Command {
        name: "import",
        aliases: &[],
        summary: "Replace all accounts and transactions with an exported file",
        usage: "import <path> [--yes]",
        run: cmd_import,
    },
    Command {
        name: "migrate",
        aliases: &[],
        summary: "Convert a legacy data blob and adopt its records",
        usage: "migrate <path>",
        run: cmd_migrate,
    },
    Command {
        name: "backup",
        aliases: &[],
        summary: "Create, list, or restore backups of the committed ledger",
        usage: BACKUP_USAGE,
        run: cmd_backup,
    },
];

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args.first().ok_or_else(|| usage_error("export <path> [display name]"))?;
    let owner = context.manager.owner_id().to_string();
    let display_name = args.get(1).copied().unwrap_or(owner.as_str()).to_string();
    let profile = UserProfile::new(owner, display_name);
    let document = context.manager.export_to_path(profile, Path::new(path))?;
    output::success(format!(
        "Exported {} account(s) and {} transaction(s) to {}.",
        document.accounts.len(),
        document.transactions.len(),
        path
    ));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (assume_yes, args) = take_switch(args, "--yes");
    let [path] = args.as_slice() else {
        return Err(usage_error("import <path> [--yes]"));
    };
    let store = context.manager.store();
    let has_data = !store.accounts().is_empty() || !store.transactions().is_empty();
    let confirmation = if !has_data || assume_yes {
        ImportConfirmation::Overwrite
    } else if context.mode == CliMode::Interactive
        && context.confirm("Replace all existing accounts and transactions?", false)?
    {
        ImportConfirmation::Overwrite
    } else {
        ImportConfirmation::KeepExisting
    };

    match context
        .manager
        .import_from_path(Path::new(path), confirmation)
    {
        Ok(summary) => {
            output::success(format!(
                "Imported {} account(s) and {} transaction(s).",
                summary.accounts, summary.transactions
            ));
            Ok(())
        }
        Err(LedgerError::ImportNotConfirmed) => {
            output::warning("Import cancelled; existing data kept. Pass --yes to overwrite.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_migrate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args.first().ok_or_else(|| usage_error("migrate <path>"))?;
    let raw = fs::read_to_string(path)?;
    let blob = LegacyBlob::from_json(&raw);

    let now = context.manager.store().clock().now();
    let mut options = MigrationOptions::new(context.manager.owner_id(), now);
    if let Some(id) = context.manager.store().selected_account_id() {
        options = options.with_fallback_account(id);
    }
    let migration = migrate_blob(&blob, context.manager.catalog().user_categories(), &options);
    let report = migration.report.clone();
    let applied = context.manager.apply_migration(migration);

    output::success(format!(
        "Migrated schema v{}: {} transaction(s) added, {} record(s) skipped.",
        report.source_version, applied.added, report.skipped
    ));
    if applied.orphaned > 0 {
        output::warning(format!(
            "{} transaction(s) named an account that does not exist and were dropped.",
            applied.orphaned
        ));
    }
    if report.unresolved_categories > 0 {
        output::warning(format!(
            "{} record(s) reference an unknown category.",
            report.unresolved_categories
        ));
    }
    for warning in &report.warnings {
        output::warning(warning);
    }
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, BACKUP_USAGE)?;
    let key = context.manager.keys().state.clone();
    match action.as_str() {
        "create" => {
            if context.manager.is_dirty() {
                output::warning("Uncommitted changes are not part of the backup.");
            }
            let note = (!rest.is_empty()).then(|| rest.join(" "));
            let name = context.files.backup(&key, note.as_deref())?;
            output::success(format!("Backup `{}` created.", name));
            Ok(())
        }
        "list" => {
            let backups = context.files.list_backups(&key)?;
            if backups.is_empty() {
                output::info("No backups yet.");
            }
            for name in backups {
                println!("{}", name);
            }
            Ok(())
        }
        "restore" => {
            let name = rest.first().ok_or_else(|| usage_error(BACKUP_USAGE))?;
            if context.manager.is_dirty()
                && !context.confirm("Discard uncommitted changes and restore?", false)?
            {
                return Err(CommandError::Message(
                    "Restore cancelled; commit or discard pending changes first.".into(),
                ));
            }
            context.files.restore_backup(&key, name)?;
            let report = context.manager.load()?;
            output::success(format!(
                "Restored `{}`: {} account(s), {} transaction(s).",
                name, report.accounts, report.transactions
            ));
            Ok(())
        }
        _ => Err(usage_error(BACKUP_USAGE)),
    }
}
