mod common;

use std::collections::HashSet;

use common::{config, fixed_clock, income, memory_manager};
use ledger_core::core::LedgerManager;
use ledger_core::domain::{PendingSyncOp, SyncEntityKind, SyncOpKind};
use ledger_core::storage::MemoryStore;
use ledger_core::sync::SyncTransport;
use uuid::Uuid;

#[derive(Default)]
struct RecordingTransport {
    seen: Vec<Uuid>,
    reject: HashSet<Uuid>,
}

impl SyncTransport for RecordingTransport {
    type Error = String;

    fn push(&mut self, op: &PendingSyncOp) -> Result<(), Self::Error> {
        if self.reject.contains(&op.id) {
            return Err(format!("backend rejected {}", op.id));
        }
        self.seen.push(op.id);
        Ok(())
    }
}

fn offline_manager() -> LedgerManager {
    let mut manager = memory_manager();
    manager.set_online(false);
    manager
}

#[test]
fn offline_mutations_queue_in_order() {
    let mut manager = offline_manager();
    let wallet = manager.create_account("Wallet", "cash");
    let txn_id = manager.add_local_transaction(income(wallet.id, 25.0));
    manager.delete_local_transaction(txn_id);

    let ops: Vec<(SyncOpKind, SyncEntityKind)> = manager
        .queue()
        .pending()
        .iter()
        .map(|op| (op.op, op.entity))
        .collect();
    assert_eq!(
        ops,
        vec![
            (SyncOpKind::Create, SyncEntityKind::Account),
            (SyncOpKind::Create, SyncEntityKind::Transaction),
            (SyncOpKind::Delete, SyncEntityKind::Transaction),
        ]
    );
    // No merging: create and delete of the same transaction both remain.
    assert_eq!(manager.queue().pending()[1].entity_id, txn_id.to_string());
    assert_eq!(manager.queue().pending()[2].entity_id, txn_id.to_string());
}

#[test]
fn online_mutations_do_not_queue() {
    let mut manager = memory_manager();
    manager.set_online(true);
    manager.create_account("Wallet", "cash");
    assert!(manager.queue().is_empty());
}

#[test]
fn cascade_delete_queues_every_removed_record() {
    let mut manager = offline_manager();
    let wallet = manager.create_account("Wallet", "cash");
    manager.add_local_transaction(income(wallet.id, 1.0));
    manager.add_local_transaction(income(wallet.id, 2.0));
    manager.clear_pending_sync();

    manager.delete_account(wallet.id);
    let deletes = manager
        .queue()
        .pending()
        .iter()
        .filter(|op| op.op == SyncOpKind::Delete)
        .count();
    assert_eq!(deletes, 3);
}

#[test]
fn replay_stops_at_first_rejection() {
    let mut manager = offline_manager();
    let wallet = manager.create_account("Wallet", "cash");
    manager.add_local_transaction(income(wallet.id, 5.0));
    manager.add_local_transaction(income(wallet.id, 6.0));
    let ids: Vec<Uuid> = manager.queue().pending().iter().map(|op| op.id).collect();

    let mut transport = RecordingTransport::default();
    transport.reject.insert(ids[1]);
    let report = manager.replay_pending(&mut transport);
    assert_eq!(report.acknowledged, vec![ids[0]]);
    assert_eq!(report.failed.as_ref().map(|(id, _)| *id), Some(ids[1]));
    assert_eq!(report.remaining, 2);
    assert_eq!(manager.queue().pending()[0].id, ids[1]);

    transport.reject.clear();
    let report = manager.replay_pending(&mut transport);
    assert!(report.failed.is_none());
    assert_eq!(report.remaining, 0);
    assert_eq!(transport.seen, ids);
}

#[test]
fn queue_survives_commit_and_reload() {
    let mut manager = offline_manager();
    manager.create_account("Wallet", "cash");
    let queued = manager.queue().pending().to_vec();
    manager.commit().expect("commit");

    manager.clear_pending_sync();
    assert!(manager.queue().is_empty());
    manager.load().expect("reload");
    assert_eq!(manager.queue().pending(), queued.as_slice());
}

#[test]
fn remove_unknown_op_is_a_no_op() {
    let mut manager = LedgerManager::new(Box::new(MemoryStore::new()), &config(), fixed_clock());
    manager.set_online(false);
    manager.create_account("Wallet", "cash");
    assert!(manager.remove_pending_sync(Uuid::new_v4()).is_none());
    assert_eq!(manager.queue().len(), 1);
}
