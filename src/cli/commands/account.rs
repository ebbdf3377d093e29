use crate::cli::core::{short_id, CommandResult};
use crate::cli::output::{self, render_table, section};
use crate::cli::shell_context::ShellContext;
use crate::core::{CascadeOutcome, TransferOutcome};

use super::{subcommand, usage_error, Command};

const ACCOUNT_USAGE: &str = "account <add|list|select|delete> ...";

pub(super) const COMMANDS: &[Command] = &[
    Command {
        name: "account",
        aliases: &["accounts"],
        summary: "Create, list, select, or delete accounts",
        usage: "account add <name> [type] | account list | account select <ref> | account delete <ref>",
        run: cmd_account,
    },
    Command {
        name: "transfer",
        aliases: &[],
        summary: "Move every transaction and the balance of one account onto another",
        usage: "transfer <from> <to>",
        run: cmd_transfer,
    },
];

fn cmd_account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, ACCOUNT_USAGE)?;
    match action.as_str() {
        "add" | "new" => add(context, rest),
        "list" | "ls" => list(context),
        "select" | "use" => select(context, rest),
        "delete" | "rm" => delete(context, rest),
        _ => Err(usage_error(ACCOUNT_USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args
        .first()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| usage_error("account add <name> [type]"))?;
    let account_type = args.get(1).copied().unwrap_or("cash");
    let account = context.manager.create_account(name, account_type);
    output::success(format!(
        "Account `{}` created ({}).",
        account.name,
        short_id(account.id)
    ));
    if context.manager.store().selected_account_id() == Some(account.id) {
        output::info(format!("`{}` is now the selected account.", account.name));
    }
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let store = context.manager.store();
    let selected = store.selected_account_id();
    let accounts = store.accounts_by_owner(context.manager.owner_id());
    if accounts.is_empty() {
        output::info("No accounts yet. Use `account add <name>` to create one.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = accounts
        .iter()
        .map(|account| {
            vec![
                if selected == Some(account.id) { "*" } else { "" }.to_string(),
                short_id(account.id),
                account.name.clone(),
                account.account_type.clone(),
                format!("{:.2}", account.balance),
            ]
        })
        .collect();
    section("Accounts");
    println!("{}", render_table(&["", "ID", "Name", "Type", "Balance"], &rows));
    Ok(())
}

fn select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args
        .first()
        .ok_or_else(|| usage_error("account select <ref>"))?;
    let id = context.resolve_account(reference)?;
    context.manager.select_account(id);
    let name = context.manager.store().account_name(id).unwrap_or_default();
    output::success(format!("Selected `{}`.", name));
    Ok(())
}

fn delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args
        .first()
        .ok_or_else(|| usage_error("account delete <ref>"))?;
    let id = context.resolve_account(reference)?;
    let count = context
        .manager
        .store()
        .transactions()
        .iter()
        .filter(|txn| txn.account_id == id)
        .count();
    let prompt = format!("Delete account and its {} transaction(s)?", count);
    if !context.confirm(&prompt, true)? {
        output::info("Delete cancelled.");
        return Ok(());
    }

    match context.manager.delete_account(id) {
        CascadeOutcome::Deleted(report) => {
            output::success(format!(
                "Account `{}` deleted with {} transaction(s).",
                report.account.name,
                report.removed_transaction_ids.len()
            ));
            if report.selection_changed {
                let now = report
                    .selected_account_id
                    .and_then(|id| context.manager.store().account_name(id))
                    .unwrap_or("none");
                output::info(format!("Selected account is now `{}`.", now));
            }
        }
        CascadeOutcome::NotFound(_) => output::warning("Account no longer exists."),
    }
    Ok(())
}

fn cmd_transfer(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [from, to] = args else {
        return Err(usage_error("transfer <from> <to>"));
    };
    let from = context.resolve_account(from)?;
    let to = context.resolve_account(to)?;
    match context.manager.transfer(from, to) {
        TransferOutcome::Transferred {
            moved_transactions,
            moved_balance,
        } => output::success(format!(
            "Moved {} transaction(s) and {:.2} onto `{}`.",
            moved_transactions,
            moved_balance,
            context.manager.store().account_name(to).unwrap_or_default()
        )),
        TransferOutcome::SameAccount => {
            output::warning("Source and destination are the same account; nothing moved.")
        }
        TransferOutcome::MissingAccount(id) => {
            output::warning(format!("Account {} not found; nothing moved.", short_id(id)))
        }
    }
    Ok(())
}
