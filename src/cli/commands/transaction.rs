use crate::cli::core::{
    parse_amount, parse_date, parse_direction, short_id, CommandError, CommandResult,
};
use crate::cli::output::{self, render_table, section};
use crate::cli::shell_context::ShellContext;
use crate::domain::{Transaction, TransactionPatch};

use super::{subcommand, take_flag, usage_error, Command};

const TX_USAGE: &str = "tx <add|list|edit|delete> ...";
const ADD_USAGE: &str =
    "tx add <income|expense> <amount> [description] [--date YYYY-MM-DD] [--category id]";
const EDIT_USAGE: &str =
    "tx edit <ref> [--amount n] [--direction d] [--description text] [--date YYYY-MM-DD]";

pub(super) const COMMANDS: &[Command] = &[Command {
        name: "tx",
        aliases: &["transaction"],
        summary: "Add, list, edit, or delete transactions on the selected account",
        usage: "tx add <income|expense> <amount> [description] | tx list [account] | tx edit <ref> ... | tx delete <ref>",
        run: cmd_tx,
    }];

fn cmd_tx(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, TX_USAGE)?;
    match action.as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context, rest),
        "edit" => edit(context, rest),
        "delete" | "rm" => delete(context, rest),
        _ => Err(usage_error(TX_USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (date, args) = take_flag(args, "--date");
    let (category, args) = take_flag(&args, "--category");
    let (direction, amount, description) = match args.as_slice() {
        [direction, amount, rest @ ..] => (*direction, *amount, rest.join(" ")),
        _ => return Err(usage_error(ADD_USAGE)),
    };
    let direction = parse_direction(direction)?;
    let amount = parse_amount(amount)?;
    let date = match date {
        Some(raw) => parse_date(raw)?,
        None => context.manager.store().clock().today(),
    };

    let account = context.selected_account()?;
    let (account_id, account_name) = (account.id, account.name.clone());
    let now = context.manager.store().clock().now();
    let mut txn = Transaction::new(
        account_id,
        context.manager.owner_id().to_string(),
        amount,
        direction,
        date,
        now,
    )
    .with_description(description);
    if let Some(category) = category {
        if context.manager.catalog().find(category).is_none() {
            return Err(CommandError::InvalidArguments(format!(
                "unknown category `{}`",
                category
            )));
        }
        txn = txn.with_category_id(category);
    }

    let id = context.manager.add_local_transaction(txn);
    let balance = context
        .manager
        .store()
        .account(account_id)
        .map(|account| account.balance)
        .unwrap_or_default();
    output::success(format!(
        "Recorded {} {:.2} on `{}` ({}). Balance: {:.2}",
        direction,
        amount,
        account_name,
        short_id(id),
        balance
    ));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let account_id = match args.first() {
        Some(reference) => context.resolve_account(reference)?,
        None => context.selected_account()?.id,
    };
    let store = context.manager.store();
    let mut transactions: Vec<&Transaction> = store
        .transactions()
        .iter()
        .filter(|txn| txn.account_id == account_id)
        .collect();
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

    let name = store.account_name(account_id).unwrap_or_default();
    if transactions.is_empty() {
        output::info(format!("No transactions on `{}`.", name));
        return Ok(());
    }
    let catalog = context.manager.catalog();
    let rows: Vec<Vec<String>> = transactions
        .iter()
        .map(|txn| {
            let category = txn
                .category_id
                .as_deref()
                .map(|id| catalog.find(id).map_or(id, |category| category.name.as_str()))
                .unwrap_or("-");
            vec![
                short_id(txn.id),
                txn.date.to_string(),
                format!("{:.2}", txn.signed_amount()),
                category.to_string(),
                txn.description.clone(),
            ]
        })
        .collect();
    section(format!("Transactions on {}", name));
    println!(
        "{}",
        render_table(&["ID", "Date", "Amount", "Category", "Description"], &rows)
    );
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (amount, args) = take_flag(args, "--amount");
    let (direction, args) = take_flag(&args, "--direction");
    let (description, args) = take_flag(&args, "--description");
    let (date, args) = take_flag(&args, "--date");
    let [reference] = args.as_slice() else {
        return Err(usage_error(EDIT_USAGE));
    };

    let patch = TransactionPatch {
        amount: amount.map(parse_amount).transpose()?,
        direction: direction.map(parse_direction).transpose()?,
        description: description.map(str::to_string),
        date: date.map(parse_date).transpose()?,
        ..TransactionPatch::default()
    };
    if patch.is_empty() {
        return Err(usage_error(EDIT_USAGE));
    }
    let id = context.resolve_transaction(reference)?;
    match context.manager.edit_transaction(id, patch) {
        Some(txn) => output::success(format!(
            "Transaction {} updated: {:.2} on {}.",
            short_id(txn.id),
            txn.signed_amount(),
            txn.date
        )),
        None => output::warning("Transaction no longer exists."),
    }
    Ok(())
}

fn delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args.first().ok_or_else(|| usage_error("tx delete <ref>"))?;
    let id = context.resolve_transaction(reference)?;
    match context.manager.delete_local_transaction(id) {
        Some(removed) => output::success(format!(
            "Deleted transaction {} ({:.2}).",
            short_id(removed.id),
            removed.signed_amount()
        )),
        None => output::warning("Transaction no longer exists."),
    }
    Ok(())
}
