use uuid::Uuid;

use super::LedgerStore;

/// Result of [`LedgerStore::transfer_all_account_transactions`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Transferred {
        moved_transactions: usize,
        moved_balance: f64,
    },
    /// Source and destination are the same account; nothing changed.
    SameAccount,
    /// The named account does not exist; nothing changed.
    MissingAccount(Uuid),
}

impl TransferOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransferOutcome::Transferred { .. })
    }
}

impl LedgerStore {
    /// Moves every transaction and the whole balance of `from` onto `to`.
    ///
    /// Afterwards `to` holds the sum of both previous balances and `from`
    /// holds zero. The new ledger is assembled off to the side and swapped in
    /// at once.
    pub fn transfer_all_account_transactions(&mut self, from: Uuid, to: Uuid) -> TransferOutcome {
        if from == to {
            tracing::warn!(account_id = %from, "transfer onto the same account ignored");
            return TransferOutcome::SameAccount;
        }
        let Some(from_balance) = self.state.account(from).map(|account| account.balance) else {
            tracing::warn!(account_id = %from, "transfer source not found");
            return TransferOutcome::MissingAccount(from);
        };
        if self.state.account(to).is_none() {
            tracing::warn!(account_id = %to, "transfer destination not found");
            return TransferOutcome::MissingAccount(to);
        }

        let now = self.clock.now();
        let mut next = self.state.clone();
        let mut moved_transactions = 0;
        for txn in next.transactions.iter_mut().filter(|txn| txn.account_id == from) {
            txn.account_id = to;
            txn.updated_at = now;
            moved_transactions += 1;
        }
        for account in next.accounts.iter_mut() {
            if account.id == from {
                account.balance = 0.0;
                account.updated_at = now;
            } else if account.id == to {
                account.balance += from_balance;
                account.updated_at = now;
            }
        }
        self.commit(next);

        tracing::info!(
            %from,
            %to,
            moved_transactions,
            moved_balance = from_balance,
            "account transactions transferred"
        );
        TransferOutcome::Transferred {
            moved_transactions,
            moved_balance: from_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::core::clock::FixedClock;
    use crate::domain::{Direction, NewAccount, Transaction};

    fn store() -> LedgerStore {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap());
        LedgerStore::new(Arc::new(clock))
    }

    fn income(account_id: Uuid, amount: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        Transaction::new(account_id, "u1", amount, Direction::Income, date, Utc::now())
    }

    #[test]
    fn moves_transactions_and_balance() {
        let mut store = store();
        let a = store.create_account(NewAccount::new("A", "cash", "u1"));
        let b = store.create_account(NewAccount::new("B", "bank", "u1"));
        store.add_transaction(income(a.id, 600.0));
        store.add_transaction(income(a.id, 400.0));
        store.sync_accounts_with_transactions();

        let outcome = store.transfer_all_account_transactions(a.id, b.id);
        assert_eq!(
            outcome,
            TransferOutcome::Transferred {
                moved_transactions: 2,
                moved_balance: 1000.0
            }
        );
        assert_eq!(store.account(a.id).unwrap().balance, 0.0);
        assert_eq!(store.account(b.id).unwrap().balance, 1000.0);
        assert!(store.transactions().iter().all(|txn| txn.account_id == b.id));
        assert!(store.balance_drift().is_empty());
    }

    #[test]
    fn adds_onto_existing_destination_balance() {
        let mut store = store();
        let a = store.create_account(NewAccount::new("A", "cash", "u1"));
        let b = store.create_account(NewAccount::new("B", "bank", "u1"));
        store.add_transaction(income(a.id, 10.0));
        store.add_transaction(income(b.id, 5.0));
        store.sync_accounts_with_transactions();

        store.transfer_all_account_transactions(a.id, b.id);
        assert_eq!(store.account(b.id).unwrap().balance, 15.0);
    }

    #[test]
    fn same_account_is_a_no_op() {
        let mut store = store();
        let a = store.create_account(NewAccount::new("A", "cash", "u1"));
        store.add_transaction(income(a.id, 10.0));
        store.sync_accounts_with_transactions();
        let before = store.state().clone();

        assert_eq!(
            store.transfer_all_account_transactions(a.id, a.id),
            TransferOutcome::SameAccount
        );
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn missing_account_is_a_no_op() {
        let mut store = store();
        let a = store.create_account(NewAccount::new("A", "cash", "u1"));
        store.add_transaction(income(a.id, 10.0));
        let before = store.state().clone();
        let ghost = Uuid::new_v4();

        assert_eq!(
            store.transfer_all_account_transactions(a.id, ghost),
            TransferOutcome::MissingAccount(ghost)
        );
        assert_eq!(
            store.transfer_all_account_transactions(ghost, a.id),
            TransferOutcome::MissingAccount(ghost)
        );
        assert_eq!(store.state(), &before);
    }
}
