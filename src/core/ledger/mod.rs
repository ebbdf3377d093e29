//! In-memory ledger state and its single-writer store.

mod balance;
mod cascade;
mod transfer;

pub use balance::{BalanceDrift, BalanceStrategy};
pub use cascade::{CascadeOutcome, CascadeReport};
pub use transfer::TransferOutcome;

use std::sync::Arc;

use uuid::Uuid;

use crate::core::clock::Clock;
use crate::domain::{Account, NewAccount, OwnedEntity, Transaction, TransactionPatch};

/// Accounts, transactions, and the selected-account pointer as one value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub selected_account_id: Option<Uuid>,
}

impl LedgerState {
    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    /// Points the selection at the first account when the current pointer is
    /// empty or dangling.
    pub(crate) fn repair_selection(&mut self) -> bool {
        let valid = self
            .selected_account_id
            .map_or(false, |id| self.account(id).is_some());
        if valid {
            return false;
        }
        let next = self.accounts.first().map(|account| account.id);
        let changed = next != self.selected_account_id;
        self.selected_account_id = next;
        changed
    }
}

/// Authoritative owner of the ledger state.
///
/// Mutators never fail. Operations spanning several records build the complete
/// next [`LedgerState`] and swap it in with a single assignment, so readers see
/// either the old or the new ledger. Balance maintenance is the caller's
/// choice, see [`BalanceStrategy`].
pub struct LedgerStore {
    state: LedgerState,
    clock: Arc<dyn Clock>,
}

impl LedgerStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_state(LedgerState::default(), clock)
    }

    pub fn with_state(state: LedgerState, clock: Arc<dyn Clock>) -> Self {
        Self { state, clock }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn accounts(&self) -> &[Account] {
        &self.state.accounts
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn selected_account_id(&self) -> Option<Uuid> {
        self.state.selected_account_id
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn commit(&mut self, next: LedgerState) {
        self.state = next;
    }

    /// Appends a new zero-balance account. The first account of an empty
    /// store becomes the selected account.
    pub fn create_account(&mut self, input: NewAccount) -> Account {
        let account = Account::new(input, self.clock.now());
        let bootstrap = self.state.accounts.is_empty();
        self.state.accounts.push(account.clone());
        if bootstrap {
            self.state.selected_account_id = Some(account.id);
        }
        tracing::debug!(
            account_id = %account.id,
            owner_id = %account.owner_id,
            selected = bootstrap,
            "account created"
        );
        account
    }

    /// Moves the selection pointer. Unknown ids leave it untouched.
    pub fn select_account(&mut self, id: Uuid) -> bool {
        if self.state.account(id).is_none() {
            tracing::warn!(account_id = %id, "ignoring selection of unknown account");
            return false;
        }
        self.state.selected_account_id = Some(id);
        true
    }

    /// Appends the record only. Balances are not touched, which keeps bulk
    /// loads from double-applying deltas.
    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        tracing::debug!(transaction_id = %id, account_id = %transaction.account_id, "transaction added");
        self.state.transactions.push(transaction);
        id
    }

    /// Applies `patch` to the record. The owning account's balance is left
    /// stale until the caller resyncs or applies a delta.
    pub fn update_transaction(
        &mut self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> Option<&Transaction> {
        let now = self.clock.now();
        let txn = self.state.transactions.iter_mut().find(|txn| txn.id == id)?;
        patch.apply_to(txn, now);
        tracing::debug!(transaction_id = %id, "transaction updated");
        Some(&*txn)
    }

    /// Removes the record and returns it. Balances are left stale.
    pub fn delete_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let index = self
            .state
            .transactions
            .iter()
            .position(|txn| txn.id == id)?;
        tracing::debug!(transaction_id = %id, "transaction deleted");
        Some(self.state.transactions.remove(index))
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.state.account(id)
    }

    pub fn account_name(&self, id: Uuid) -> Option<&str> {
        self.account(id).map(|account| account.name.as_str())
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.state.transactions.iter().find(|txn| txn.id == id)
    }

    /// Accounts belonging to `owner_id` and nobody else.
    pub fn accounts_by_owner(&self, owner_id: &str) -> Vec<&Account> {
        self.state
            .accounts
            .iter()
            .filter(|account| account.is_owned_by(owner_id))
            .collect()
    }

    /// Transactions belonging to `owner_id` and nobody else.
    pub fn transactions_by_owner(&self, owner_id: &str) -> Vec<&Transaction> {
        self.state
            .transactions
            .iter()
            .filter(|txn| txn.is_owned_by(owner_id))
            .collect()
    }

    /// Swaps in a whole new account and transaction set, as done by an import
    /// or backup restore. Balances are recomputed and the selection repaired
    /// in the same step.
    pub fn replace_all(&mut self, accounts: Vec<Account>, transactions: Vec<Transaction>) {
        self.adopt(LedgerState {
            accounts,
            transactions,
            selected_account_id: self.state.selected_account_id,
        });
    }

    /// Installs a loaded state wholesale. Stored balances are not trusted:
    /// they are recomputed, and a dangling selection is repaired. Returns how
    /// many balances were corrected.
    pub fn adopt(&mut self, mut next: LedgerState) -> usize {
        let corrected = balance::recompute(&mut next, self.clock.now());
        next.repair_selection();
        tracing::info!(
            accounts = next.accounts.len(),
            transactions = next.transactions.len(),
            corrected,
            "ledger contents replaced"
        );
        self.commit(next);
        corrected
    }
}
