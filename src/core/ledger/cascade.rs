use uuid::Uuid;

use super::LedgerStore;
use crate::domain::Account;

/// What a cascading account delete removed.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeReport {
    pub account: Account,
    pub removed_transaction_ids: Vec<Uuid>,
    pub selection_changed: bool,
    pub selected_account_id: Option<Uuid>,
}

/// Result of [`LedgerStore::delete_account`].
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeOutcome {
    Deleted(CascadeReport),
    /// No account with that id; nothing changed.
    NotFound(Uuid),
}

impl LedgerStore {
    /// Removes an account together with every transaction booked on it.
    ///
    /// When the account was selected the pointer moves to the first remaining
    /// account, or becomes empty. Deleting the last account is allowed; any
    /// "keep one account" rule belongs to the caller.
    pub fn delete_account(&mut self, account_id: Uuid) -> CascadeOutcome {
        let Some(position) = self
            .state
            .accounts
            .iter()
            .position(|account| account.id == account_id)
        else {
            tracing::warn!(%account_id, "delete requested for unknown account");
            return CascadeOutcome::NotFound(account_id);
        };

        let mut next = self.state.clone();
        let account = next.accounts.remove(position);
        let (removed, kept): (Vec<_>, Vec<_>) = next
            .transactions
            .into_iter()
            .partition(|txn| txn.account_id == account_id);
        next.transactions = kept;

        let was_selected = next.selected_account_id == Some(account_id);
        if was_selected {
            next.selected_account_id = next.accounts.first().map(|account| account.id);
        }
        let selected_account_id = next.selected_account_id;
        self.commit(next);

        let removed_transaction_ids: Vec<Uuid> = removed.iter().map(|txn| txn.id).collect();
        tracing::info!(
            %account_id,
            removed_transactions = removed_transaction_ids.len(),
            reselected = was_selected,
            "account deleted"
        );
        CascadeOutcome::Deleted(CascadeReport {
            account,
            removed_transaction_ids,
            selection_changed: was_selected,
            selected_account_id,
        })
    }
}
