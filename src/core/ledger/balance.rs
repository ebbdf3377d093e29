//! Incremental and full-recompute balance maintenance.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{LedgerState, LedgerStore};
use crate::domain::{Direction, Transaction};

/// How a call site keeps account balances in step with transactions.
///
/// `Incremental` applies one signed delta for a single local change and is
/// what interactive create/delete flows use. `FullResync` recomputes every
/// balance from the transaction list and is mandatory after bulk loads. A
/// flow must stick to one of the two: an incremental delta applied after a
/// stale recompute shows a wrong balance until the next resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceStrategy {
    Incremental,
    FullResync,
}

/// An account whose stored balance disagrees with its transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceDrift {
    pub account_id: Uuid,
    pub stored: f64,
    pub derived: f64,
}

const DRIFT_TOLERANCE: f64 = 1e-9;

impl LedgerStore {
    /// Adds the signed contribution of `amount` to one account.
    pub fn update_account_balance(&mut self, account_id: Uuid, amount: f64, direction: Direction) {
        self.shift_balance(account_id, direction.signed(amount));
    }

    /// Undoes [`update_account_balance`](Self::update_account_balance) for a
    /// single transaction without a full resync.
    pub fn reverse_account_balance(&mut self, account_id: Uuid, amount: f64, direction: Direction) {
        self.shift_balance(account_id, -direction.signed(amount));
    }

    fn shift_balance(&mut self, account_id: Uuid, delta: f64) {
        let now = self.clock.now();
        match self.state.account_mut(account_id) {
            Some(account) => {
                account.balance += delta;
                account.updated_at = now;
                tracing::debug!(%account_id, delta, balance = account.balance, "balance adjusted");
            }
            None => tracing::warn!(%account_id, delta, "balance adjustment for unknown account"),
        }
    }

    /// Recomputes every balance from the transaction list. Accounts without
    /// transactions end at zero. Running it twice in a row changes nothing.
    pub fn sync_accounts_with_transactions(&mut self) {
        let now = self.clock.now();
        let mut next = self.state.clone();
        let changed = recompute(&mut next, now);
        tracing::debug!(accounts = next.accounts.len(), changed, "balances resynced");
        self.commit(next);
    }

    /// Adds a transaction and maintains balances with `strategy`.
    pub fn record_transaction(&mut self, transaction: Transaction, strategy: BalanceStrategy) -> Uuid {
        let account_id = transaction.account_id;
        let amount = transaction.amount;
        let direction = transaction.direction;
        let id = self.add_transaction(transaction);
        match strategy {
            BalanceStrategy::Incremental => self.update_account_balance(account_id, amount, direction),
            BalanceStrategy::FullResync => self.sync_accounts_with_transactions(),
        }
        id
    }

    /// Deletes a transaction and maintains balances with `strategy`.
    pub fn remove_transaction(&mut self, id: Uuid, strategy: BalanceStrategy) -> Option<Transaction> {
        let removed = self.delete_transaction(id)?;
        match strategy {
            BalanceStrategy::Incremental => {
                self.reverse_account_balance(removed.account_id, removed.amount, removed.direction)
            }
            BalanceStrategy::FullResync => self.sync_accounts_with_transactions(),
        }
        Some(removed)
    }

    /// Balance each account would have after a full resync.
    pub fn derived_balances(&self) -> HashMap<Uuid, f64> {
        derive(&self.state)
    }

    /// Accounts whose stored balance no longer matches their transactions.
    pub fn balance_drift(&self) -> Vec<BalanceDrift> {
        let derived = self.derived_balances();
        self.state
            .accounts
            .iter()
            .filter_map(|account| {
                let expected = derived.get(&account.id).copied().unwrap_or(0.0);
                ((account.balance - expected).abs() > DRIFT_TOLERANCE).then(|| BalanceDrift {
                    account_id: account.id,
                    stored: account.balance,
                    derived: expected,
                })
            })
            .collect()
    }
}

fn derive(state: &LedgerState) -> HashMap<Uuid, f64> {
    let mut sums: HashMap<Uuid, f64> = HashMap::new();
    for txn in &state.transactions {
        *sums.entry(txn.account_id).or_insert(0.0) += txn.signed_amount();
    }
    sums
}

/// Writes derived balances into `state`, returning how many accounts changed.
pub(crate) fn recompute(state: &mut LedgerState, now: DateTime<Utc>) -> usize {
    let sums = derive(state);
    let mut changed = 0;
    for account in &mut state.accounts {
        let balance = sums.get(&account.id).copied().unwrap_or(0.0);
        if account.balance != balance {
            account.balance = balance;
            account.updated_at = now;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::core::clock::FixedClock;
    use crate::domain::NewAccount;

    fn store() -> LedgerStore {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        LedgerStore::new(Arc::new(clock))
    }

    fn txn(account_id: Uuid, amount: f64, direction: Direction) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        Transaction::new(account_id, "u1", amount, direction, date, Utc::now())
    }

    #[test]
    fn incremental_delta_and_its_inverse_cancel_out() {
        let mut store = store();
        let account = store.create_account(NewAccount::new("Wallet", "cash", "u1"));
        store.update_account_balance(account.id, 120.0, Direction::Income);
        store.update_account_balance(account.id, 20.0, Direction::Expense);
        assert_eq!(store.account(account.id).unwrap().balance, 100.0);

        store.reverse_account_balance(account.id, 20.0, Direction::Expense);
        store.reverse_account_balance(account.id, 120.0, Direction::Income);
        assert_eq!(store.account(account.id).unwrap().balance, 0.0);
    }

    #[test]
    fn delta_only_touches_named_account() {
        let mut store = store();
        let a = store.create_account(NewAccount::new("A", "cash", "u1"));
        let b = store.create_account(NewAccount::new("B", "cash", "u1"));
        store.update_account_balance(a.id, 50.0, Direction::Income);
        assert_eq!(store.account(b.id).unwrap().balance, 0.0);
        store.update_account_balance(Uuid::new_v4(), 50.0, Direction::Income);
        assert_eq!(store.account(a.id).unwrap().balance, 50.0);
    }

    #[test]
    fn resync_uses_absolute_amounts() {
        let mut store = store();
        let account = store.create_account(NewAccount::new("Wallet", "cash", "u1"));
        store.add_transaction(txn(account.id, -200.0, Direction::Income));
        store.add_transaction(txn(account.id, -50.0, Direction::Expense));
        store.sync_accounts_with_transactions();
        assert_eq!(store.account(account.id).unwrap().balance, 150.0);
    }

    #[test]
    fn resync_zeroes_accounts_without_transactions() {
        let mut store = store();
        let account = store.create_account(NewAccount::new("Wallet", "cash", "u1"));
        store.update_account_balance(account.id, 75.0, Direction::Income);
        store.sync_accounts_with_transactions();
        assert_eq!(store.account(account.id).unwrap().balance, 0.0);
    }

    #[test]
    fn resync_is_idempotent() {
        let mut store = store();
        let a = store.create_account(NewAccount::new("A", "cash", "u1"));
        let b = store.create_account(NewAccount::new("B", "bank", "u1"));
        store.add_transaction(txn(a.id, 10.5, Direction::Income));
        store.add_transaction(txn(b.id, 3.25, Direction::Expense));
        store.add_transaction(txn(a.id, 0.1, Direction::Expense));

        store.sync_accounts_with_transactions();
        let first = store.state().clone();
        store.sync_accounts_with_transactions();
        assert_eq!(store.state(), &first);
        assert!(store.balance_drift().is_empty());
    }

    #[test]
    fn strategies_reach_the_same_balance() {
        let mut incremental = store();
        let mut resync = store();
        let a = incremental.create_account(NewAccount::new("A", "cash", "u1"));
        let b = resync.create_account(NewAccount::new("A", "cash", "u1"));

        incremental.record_transaction(txn(a.id, 40.0, Direction::Income), BalanceStrategy::Incremental);
        let spent = incremental.record_transaction(txn(a.id, 15.0, Direction::Expense), BalanceStrategy::Incremental);
        resync.record_transaction(txn(b.id, 40.0, Direction::Income), BalanceStrategy::FullResync);
        resync.record_transaction(txn(b.id, 15.0, Direction::Expense), BalanceStrategy::FullResync);

        assert_eq!(incremental.account(a.id).unwrap().balance, 25.0);
        assert_eq!(resync.account(b.id).unwrap().balance, 25.0);

        incremental.remove_transaction(spent, BalanceStrategy::Incremental);
        assert_eq!(incremental.account(a.id).unwrap().balance, 40.0);
    }

    #[test]
    fn drift_reports_stale_balances() {
        let mut store = store();
        let account = store.create_account(NewAccount::new("Wallet", "cash", "u1"));
        store.add_transaction(txn(account.id, 10.0, Direction::Income));
        let drift = store.balance_drift();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].derived, 10.0);
        assert_eq!(drift[0].stored, 0.0);
    }
}
