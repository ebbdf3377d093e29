//! Service object tying the ledger store, the sync queue, and storage together.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::CategoryCatalog;
use crate::config::Config;
use crate::core::clock::Clock;
use crate::core::ledger::{
    BalanceStrategy, CascadeOutcome, LedgerState, LedgerStore, TransferOutcome,
};
use crate::domain::{
    Account, Category, NewAccount, PendingSyncOp, SyncEntityKind, SyncOpKind, Transaction,
    TransactionPatch, UserProfile,
};
use crate::errors::{LedgerError, Result};
use crate::migration::LegacyMigration;
use crate::storage::json_backend::save_json_to_path;
use crate::storage::{self, ExportDocument, KeyValueStore, PersistedLedger, CURRENT_SCHEMA_VERSION};
use crate::sync::{PendingSyncQueue, ReplayReport, SyncTransport};

/// Storage keys used by one manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub state: String,
    pub pending_sync: String,
    pub categories: String,
}

impl From<&Config> for StorageKeys {
    fn from(config: &Config) -> Self {
        Self {
            state: config.state_key.clone(),
            pending_sync: config.pending_sync_key.clone(),
            categories: config.categories_key.clone(),
        }
    }
}

/// Caller's answer to "replace everything with the imported file?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportConfirmation {
    Overwrite,
    KeepExisting,
}

/// Summary of what [`LedgerManager::load`] found in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub schema_version: u32,
    pub accounts: usize,
    pub transactions: usize,
    pub pending_ops: usize,
    pub user_categories: usize,
    /// Stored balances that disagreed with their transactions and were fixed.
    pub corrected_balances: usize,
}

/// Completion signal of [`LedgerManager::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    /// Monotonic per-manager counter of successful commits.
    pub revision: u64,
    pub committed_at: DateTime<Utc>,
    pub accounts: usize,
    pub transactions: usize,
    pub pending_ops: usize,
}

/// What [`LedgerManager::apply_migration`] kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationApplied {
    pub added: usize,
    /// Ids already present in the ledger.
    pub duplicates: usize,
    /// Records whose account does not exist.
    pub orphaned: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub replaced_accounts: usize,
    pub replaced_transactions: usize,
    pub accounts: usize,
    pub transactions: usize,
}

/// Owns the ledger for one user and persists it on request.
///
/// Mutations only change memory and mark the manager dirty. Nothing reaches
/// storage until [`commit`](Self::commit) returns a receipt; work done in
/// between is lost if the process dies.
pub struct LedgerManager {
    store: LedgerStore,
    queue: PendingSyncQueue,
    catalog: CategoryCatalog,
    storage: Box<dyn KeyValueStore>,
    keys: StorageKeys,
    owner_id: String,
    dirty: bool,
    revision: u64,
}

impl LedgerManager {
    /// Empty manager. Call [`load`](Self::load) to pick up stored data.
    pub fn new(storage: Box<dyn KeyValueStore>, config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: LedgerStore::new(clock),
            queue: PendingSyncQueue::new(config.start_online),
            catalog: CategoryCatalog::default(),
            storage,
            keys: StorageKeys::from(config),
            owner_id: config.owner_id.clone(),
            dirty: false,
            revision: 0,
        }
    }

    /// Builds a manager and loads whatever `storage` already holds.
    pub fn open(
        storage: Box<dyn KeyValueStore>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, LoadReport)> {
        let mut manager = Self::new(storage, config, clock);
        let report = manager.load()?;
        Ok((manager, report))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn queue(&self) -> &PendingSyncQueue {
        &self.queue
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Whether in-memory changes are waiting for [`commit`](Self::commit).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces memory with the stored ledger, queue, and categories.
    ///
    /// Missing keys load as empty. Balances are recomputed after loading and a
    /// dangling selection is repaired. A blob written by a newer build fails
    /// with [`LedgerError::UnsupportedSchema`] and leaves memory untouched.
    pub fn load(&mut self) -> Result<LoadReport> {
        let persisted = match self.storage.get(&self.keys.state)? {
            Some(raw) => PersistedLedger::decode(&raw)?,
            None => PersistedLedger::from_state(&LedgerState::default()),
        };
        let queue = PendingSyncQueue::load_from(
            self.storage.as_ref(),
            &self.keys.pending_sync,
            self.queue.is_online(),
        )?;
        let categories: Vec<Category> =
            storage::read_json(self.storage.as_ref(), &self.keys.categories)?.unwrap_or_default();

        let schema_version = persisted.schema_version;
        let corrected_balances = self.store.adopt(persisted.into_state());
        self.queue = queue;
        self.catalog = CategoryCatalog::new(categories);
        self.dirty = corrected_balances > 0;

        let report = LoadReport {
            schema_version,
            accounts: self.store.accounts().len(),
            transactions: self.store.transactions().len(),
            pending_ops: self.queue.len(),
            user_categories: self.catalog.user_categories().len(),
            corrected_balances,
        };
        tracing::info!(
            schema_version,
            accounts = report.accounts,
            transactions = report.transactions,
            pending_ops = report.pending_ops,
            corrected_balances,
            "ledger loaded"
        );
        Ok(report)
    }

    /// Writes ledger, queue, and categories to storage.
    pub fn commit(&mut self) -> Result<CommitReceipt> {
        let persisted = PersistedLedger::from_state(self.store.state());
        storage::write_json(self.storage.as_ref(), &self.keys.state, &persisted)?;
        self.queue
            .save_to(self.storage.as_ref(), &self.keys.pending_sync)?;
        storage::write_json(
            self.storage.as_ref(),
            &self.keys.categories,
            &self.catalog.user_categories(),
        )?;

        self.revision += 1;
        self.dirty = false;
        let receipt = CommitReceipt {
            revision: self.revision,
            committed_at: self.store.clock().now(),
            accounts: persisted.accounts.len(),
            transactions: persisted.transactions.len(),
            pending_ops: self.queue.len(),
        };
        tracing::info!(
            revision = receipt.revision,
            accounts = receipt.accounts,
            transactions = receipt.transactions,
            pending_ops = receipt.pending_ops,
            "ledger committed"
        );
        Ok(receipt)
    }

    pub fn create_account(&mut self, name: &str, account_type: &str) -> Account {
        let account = self
            .store
            .create_account(NewAccount::new(name, account_type, self.owner_id.clone()));
        self.enqueue(SyncOpKind::Create, SyncEntityKind::Account, account.id, &account);
        self.dirty = true;
        account
    }

    pub fn select_account(&mut self, id: Uuid) -> bool {
        let changed = self.store.select_account(id);
        self.dirty |= changed;
        changed
    }

    /// Records a transaction entered by the user and applies its delta to the
    /// account balance.
    pub fn add_local_transaction(&mut self, transaction: Transaction) -> Uuid {
        let snapshot = transaction.clone();
        let id = self
            .store
            .record_transaction(transaction, BalanceStrategy::Incremental);
        self.enqueue(SyncOpKind::Create, SyncEntityKind::Transaction, id, &snapshot);
        self.dirty = true;
        id
    }

    /// Applies `patch` and resyncs every balance, since the amount, direction,
    /// or account may all have changed.
    pub fn edit_transaction(&mut self, id: Uuid, patch: TransactionPatch) -> Option<Transaction> {
        let updated = self.store.update_transaction(id, patch)?.clone();
        self.store.sync_accounts_with_transactions();
        self.enqueue(SyncOpKind::Update, SyncEntityKind::Transaction, id, &updated);
        self.dirty = true;
        Some(updated)
    }

    pub fn delete_local_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let removed = self
            .store
            .remove_transaction(id, BalanceStrategy::Incremental)?;
        self.enqueue(SyncOpKind::Delete, SyncEntityKind::Transaction, id, &removed);
        self.dirty = true;
        Some(removed)
    }

    pub fn transfer(&mut self, from: Uuid, to: Uuid) -> TransferOutcome {
        let moved: Vec<Uuid> = self
            .store
            .transactions()
            .iter()
            .filter(|txn| txn.account_id == from)
            .map(|txn| txn.id)
            .collect();
        let outcome = self.store.transfer_all_account_transactions(from, to);
        if outcome.is_applied() {
            for id in moved {
                if let Some(txn) = self.store.transaction(id).cloned() {
                    self.enqueue(SyncOpKind::Update, SyncEntityKind::Transaction, id, &txn);
                }
            }
            for id in [from, to] {
                if let Some(account) = self.store.account(id).cloned() {
                    self.enqueue(SyncOpKind::Update, SyncEntityKind::Account, id, &account);
                }
            }
            self.dirty = true;
        }
        outcome
    }

    pub fn delete_account(&mut self, id: Uuid) -> CascadeOutcome {
        let outcome = self.store.delete_account(id);
        if let CascadeOutcome::Deleted(report) = &outcome {
            for txn_id in &report.removed_transaction_ids {
                self.enqueue(SyncOpKind::Delete, SyncEntityKind::Transaction, *txn_id, &Value::Null);
            }
            self.enqueue(SyncOpKind::Delete, SyncEntityKind::Account, id, &report.account);
            self.dirty = true;
        }
        outcome
    }

    /// Full recompute of every balance. Returns the accounts that drifted.
    pub fn sync_balances(&mut self) -> usize {
        let drifted = self.store.balance_drift().len();
        self.store.sync_accounts_with_transactions();
        if drifted > 0 {
            self.dirty = true;
        }
        drifted
    }

    pub fn add_category(&mut self, category: Category) -> bool {
        let snapshot = category.clone();
        let added = self.catalog.add_user_category(category);
        if added {
            self.enqueue(
                SyncOpKind::Create,
                SyncEntityKind::Category,
                snapshot.id.clone(),
                &snapshot,
            );
            self.dirty = true;
        }
        added
    }

    pub fn set_online(&mut self, online: bool) {
        self.queue.set_online(online);
    }

    pub fn remove_pending_sync(&mut self, id: Uuid) -> Option<PendingSyncOp> {
        let removed = self.queue.remove_pending_sync(id);
        self.dirty |= removed.is_some();
        removed
    }

    pub fn clear_pending_sync(&mut self) -> usize {
        let cleared = self.queue.clear_pending_sync();
        self.dirty |= cleared > 0;
        cleared
    }

    pub fn replay_pending<T: SyncTransport>(&mut self, transport: &mut T) -> ReplayReport {
        let report = self.queue.replay(transport);
        self.dirty |= !report.acknowledged.is_empty();
        report
    }

    /// Adopts the output of a legacy migration: categories join the catalog
    /// (known ids are skipped), transactions are appended, and balances are
    /// recomputed from scratch. Transactions naming an account the ledger does
    /// not hold are dropped so every record stays reachable by a cascade.
    pub fn apply_migration(&mut self, migration: LegacyMigration) -> MigrationApplied {
        for category in migration.user_categories {
            if self.catalog.find(&category.id).is_none() {
                self.catalog.add_user_category(category);
            }
        }
        let mut applied = MigrationApplied::default();
        for txn in migration.transactions {
            if self.store.transaction(txn.id).is_some() {
                tracing::warn!(transaction_id = %txn.id, "migrated transaction already present");
                applied.duplicates += 1;
                continue;
            }
            if self.store.account(txn.account_id).is_none() {
                tracing::warn!(
                    transaction_id = %txn.id,
                    account_id = %txn.account_id,
                    "migrated transaction names no known account"
                );
                applied.orphaned += 1;
                continue;
            }
            self.store.add_transaction(txn);
            applied.added += 1;
        }
        self.store.sync_accounts_with_transactions();
        self.dirty = true;
        tracing::info!(
            added = applied.added,
            duplicates = applied.duplicates,
            orphaned = applied.orphaned,
            "legacy migration applied"
        );
        applied
    }

    /// Snapshot of `profile.owner_id`'s accounts and transactions.
    pub fn export_document(&self, profile: UserProfile) -> ExportDocument {
        let accounts = self
            .store
            .accounts_by_owner(&profile.owner_id)
            .into_iter()
            .cloned()
            .collect();
        let transactions = self
            .store
            .transactions_by_owner(&profile.owner_id)
            .into_iter()
            .cloned()
            .collect();
        ExportDocument::new(profile, accounts, transactions, self.store.clock().now())
    }

    pub fn export_to_path(&self, profile: UserProfile, path: &Path) -> Result<ExportDocument> {
        let document = self.export_document(profile);
        save_json_to_path(&document, path)?;
        tracing::info!(
            path = %path.display(),
            accounts = document.accounts.len(),
            transactions = document.transactions.len(),
            "ledger exported"
        );
        Ok(document)
    }

    /// Replaces both entity lists with the document's. A non-empty ledger is
    /// only overwritten with [`ImportConfirmation::Overwrite`].
    pub fn import_document(
        &mut self,
        document: ExportDocument,
        confirmation: ImportConfirmation,
    ) -> Result<ImportSummary> {
        if document.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(LedgerError::UnsupportedSchema {
                found: document.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        let has_data = !self.store.accounts().is_empty() || !self.store.transactions().is_empty();
        if has_data && confirmation != ImportConfirmation::Overwrite {
            return Err(LedgerError::ImportNotConfirmed);
        }

        let replaced_accounts = self.store.accounts().len();
        let replaced_transactions = self.store.transactions().len();
        self.store
            .replace_all(document.accounts, document.transactions);
        self.dirty = true;

        let summary = ImportSummary {
            replaced_accounts,
            replaced_transactions,
            accounts: self.store.accounts().len(),
            transactions: self.store.transactions().len(),
        };
        tracing::info!(
            accounts = summary.accounts,
            transactions = summary.transactions,
            "ledger imported"
        );
        Ok(summary)
    }

    pub fn import_from_path(
        &mut self,
        path: &Path,
        confirmation: ImportConfirmation,
    ) -> Result<ImportSummary> {
        let raw = std::fs::read_to_string(path)?;
        let document = ExportDocument::decode(&raw)?;
        self.import_document(document, confirmation)
    }

    fn enqueue<T: Serialize>(
        &mut self,
        op: SyncOpKind,
        entity: SyncEntityKind,
        entity_id: impl ToString,
        payload: &T,
    ) {
        if self.queue.is_online() {
            return;
        }
        let payload = serde_json::to_value(payload).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "sync payload could not be encoded");
            Value::Null
        });
        let op = PendingSyncOp::new(
            op,
            entity,
            entity_id.to_string(),
            payload,
            self.store.clock().now(),
        );
        self.queue.add_pending_sync(op);
    }
}
