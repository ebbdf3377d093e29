//! Buffer of local mutations awaiting replay against a remote backend.
//!
//! The queue is a flat list kept in insertion order. It does not merge,
//! deduplicate, or resolve conflicts between ops; a create followed by a
//! delete of the same entity replays as two ops.

use uuid::Uuid;

use crate::domain::PendingSyncOp;
use crate::errors::Result;
use crate::storage::{self, KeyValueStore};

/// Remote endpoint able to apply one pending op.
///
/// No backend ships with the crate; embedders implement this to drain the
/// queue.
pub trait SyncTransport {
    type Error: std::fmt::Display;

    fn push(&mut self, op: &PendingSyncOp) -> std::result::Result<(), Self::Error>;
}

/// What one [`PendingSyncQueue::replay`] run achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub acknowledged: Vec<Uuid>,
    /// Op that was rejected, stopping the run. Later ops were not attempted.
    pub failed: Option<(Uuid, String)>,
    pub remaining: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingSyncQueue {
    ops: Vec<PendingSyncOp>,
    online: bool,
}

impl PendingSyncQueue {
    pub fn new(online: bool) -> Self {
        Self {
            ops: Vec::new(),
            online,
        }
    }

    pub fn add_pending_sync(&mut self, op: PendingSyncOp) {
        tracing::debug!(
            op_id = %op.id,
            op = %op.op,
            entity = %op.entity,
            entity_id = %op.entity_id,
            "pending sync op queued"
        );
        self.ops.push(op);
    }

    /// Drops one op, typically after the backend acknowledged it.
    pub fn remove_pending_sync(&mut self, id: Uuid) -> Option<PendingSyncOp> {
        let index = self.ops.iter().position(|op| op.id == id)?;
        Some(self.ops.remove(index))
    }

    /// Empties the queue, as done after a full resync with the backend.
    pub fn clear_pending_sync(&mut self) -> usize {
        let cleared = self.ops.len();
        self.ops.clear();
        tracing::info!(cleared, "pending sync queue cleared");
        cleared
    }

    pub fn set_online(&mut self, online: bool) {
        if self.online != online {
            tracing::info!(online, pending = self.ops.len(), "connectivity changed");
        }
        self.online = online;
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Ops in the order they were queued.
    pub fn pending(&self) -> &[PendingSyncOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Pushes ops to `transport` front to back, removing each acknowledged
    /// one. Stops at the first rejection so ordering is preserved.
    pub fn replay<T: SyncTransport>(&mut self, transport: &mut T) -> ReplayReport {
        let mut report = ReplayReport::default();
        while let Some(op) = self.ops.first() {
            match transport.push(op) {
                Ok(()) => {
                    report.acknowledged.push(op.id);
                    self.ops.remove(0);
                }
                Err(err) => {
                    tracing::warn!(op_id = %op.id, error = %err, "sync replay stopped");
                    report.failed = Some((op.id, err.to_string()));
                    break;
                }
            }
        }
        report.remaining = self.ops.len();
        tracing::info!(
            acknowledged = report.acknowledged.len(),
            remaining = report.remaining,
            "sync replay finished"
        );
        report
    }

    /// Loads queued ops from `key`. A missing key yields an empty queue.
    pub fn load_from(store: &dyn KeyValueStore, key: &str, online: bool) -> Result<Self> {
        let ops: Vec<PendingSyncOp> = storage::read_json(store, key)?.unwrap_or_default();
        Ok(Self { ops, online })
    }

    pub fn save_to(&self, store: &dyn KeyValueStore, key: &str) -> Result<()> {
        storage::write_json(store, key, &self.ops)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::domain::{SyncEntityKind, SyncOpKind};
    use crate::storage::MemoryStore;

    fn op(kind: SyncOpKind, entity_id: &str) -> PendingSyncOp {
        PendingSyncOp::new(kind, SyncEntityKind::Transaction, entity_id, json!({}), Utc::now())
    }

    struct FlakyTransport {
        accept: usize,
        seen: Vec<String>,
    }

    impl SyncTransport for FlakyTransport {
        type Error = String;

        fn push(&mut self, op: &PendingSyncOp) -> std::result::Result<(), String> {
            if self.seen.len() == self.accept {
                return Err("backend unavailable".into());
            }
            self.seen.push(op.entity_id.clone());
            Ok(())
        }
    }

    #[test]
    fn keeps_insertion_order_without_dedup() {
        let mut queue = PendingSyncQueue::new(false);
        queue.add_pending_sync(op(SyncOpKind::Create, "t1"));
        queue.add_pending_sync(op(SyncOpKind::Delete, "t1"));
        queue.add_pending_sync(op(SyncOpKind::Create, "t1"));
        let kinds: Vec<_> = queue.pending().iter().map(|op| op.op).collect();
        assert_eq!(kinds, vec![SyncOpKind::Create, SyncOpKind::Delete, SyncOpKind::Create]);
    }

    #[test]
    fn remove_and_clear() {
        let mut queue = PendingSyncQueue::new(false);
        let first = op(SyncOpKind::Create, "a");
        let first_id = first.id;
        queue.add_pending_sync(first);
        queue.add_pending_sync(op(SyncOpKind::Update, "b"));
        assert!(queue.remove_pending_sync(first_id).is_some());
        assert!(queue.remove_pending_sync(first_id).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.clear_pending_sync(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn replay_stops_at_first_failure() {
        let mut queue = PendingSyncQueue::new(true);
        for id in ["a", "b", "c"] {
            queue.add_pending_sync(op(SyncOpKind::Create, id));
        }
        let mut transport = FlakyTransport {
            accept: 2,
            seen: Vec::new(),
        };
        let report = queue.replay(&mut transport);
        assert_eq!(transport.seen, vec!["a", "b"]);
        assert_eq!(report.acknowledged.len(), 2);
        assert_eq!(report.remaining, 1);
        assert!(report.failed.is_some());
        assert_eq!(queue.pending()[0].entity_id, "c");
    }

    #[test]
    fn persists_independently_of_ledger() {
        let store = MemoryStore::new();
        let mut queue = PendingSyncQueue::new(false);
        queue.add_pending_sync(op(SyncOpKind::Create, "a"));
        queue.save_to(&store, "pending").unwrap();

        let loaded = PendingSyncQueue::load_from(&store, "pending", true).unwrap();
        assert_eq!(loaded.pending(), queue.pending());
        assert!(loaded.is_online());
        assert!(PendingSyncQueue::load_from(&store, "other", false)
            .unwrap()
            .is_empty());
    }
}
