use crate::cli::core::{short_id, CommandResult};
use crate::cli::output::{self, render_table, section};
use crate::cli::shell_context::ShellContext;

use super::{usage_error, Command};

pub(super) const COMMANDS: &[Command] = &[
    Command {
        name: "sync",
        aliases: &[],
        summary: "Recompute every account balance from its transactions",
        usage: "sync",
        run: cmd_sync,
    },
    Command {
        name: "online",
        aliases: &[],
        summary: "Show or set connectivity; offline changes are queued",
        usage: "online [on|off]",
        run: cmd_online,
    },
    Command {
        name: "queue",
        aliases: &[],
        summary: "List or clear pending sync operations",
        usage: "queue [list|clear]",
        run: cmd_queue,
    },
    Command {
        name: "commit",
        aliases: &[],
        summary: "Write the ledger and queue to storage",
        usage: "commit",
        run: cmd_commit,
    },
];

fn cmd_sync(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let drifted = context.manager.sync_balances();
    if drifted == 0 {
        output::success("Balances already match their transactions.");
    } else {
        output::success(format!("Recomputed {} balance(s).", drifted));
    }
    Ok(())
}

fn cmd_online(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|arg| arg.to_lowercase()).as_deref() {
        None => {}
        Some("on" | "true" | "yes") => context.manager.set_online(true),
        Some("off" | "false" | "no") => context.manager.set_online(false),
        Some(_) => return Err(usage_error("online [on|off]")),
    }
    let state = if context.manager.queue().is_online() {
        "online"
    } else {
        "offline"
    };
    output::info(format!(
        "Status: {} ({} pending op(s)).",
        state,
        context.manager.queue().len()
    ));
    Ok(())
}

fn cmd_queue(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|arg| arg.to_lowercase()).as_deref() {
        None | Some("list") => {
            let pending = context.manager.queue().pending();
            if pending.is_empty() {
                output::info("No pending sync operations.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = pending
                .iter()
                .map(|op| {
                    vec![
                        short_id(op.id),
                        op.op.to_string(),
                        op.entity.to_string(),
                        op.entity_id.clone(),
                        op.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ]
                })
                .collect();
            section(format!("Pending sync ({})", pending.len()));
            println!(
                "{}",
                render_table(&["ID", "Op", "Entity", "Entity ID", "Queued at"], &rows)
            );
            Ok(())
        }
        Some("clear") => {
            let cleared = context.manager.clear_pending_sync();
            output::success(format!("Cleared {} pending op(s).", cleared));
            Ok(())
        }
        Some(_) => Err(usage_error("queue [list|clear]")),
    }
}

fn cmd_commit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let receipt = context.manager.commit()?;
    output::success(format!(
        "Committed revision {}: {} account(s), {} transaction(s), {} pending op(s).",
        receipt.revision, receipt.accounts, receipt.transactions, receipt.pending_ops
    ));
    Ok(())
}
