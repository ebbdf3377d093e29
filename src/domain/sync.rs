//! Records buffered while the remote backend is unreachable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of mutation a pending op replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOpKind {
    Create,
    Update,
    Delete,
}

/// Entity family a pending op targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntityKind {
    Transaction,
    Account,
    Category,
}

/// One not-yet-replayed local mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSyncOp {
    pub id: Uuid,
    pub op: SyncOpKind,
    pub entity: SyncEntityKind,
    #[serde(default)]
    pub entity_id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PendingSyncOp {
    pub fn new(
        op: SyncOpKind,
        entity: SyncEntityKind,
        entity_id: impl Into<String>,
        payload: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            op,
            entity,
            entity_id: entity_id.into(),
            payload,
            timestamp,
        }
    }
}

impl fmt::Display for SyncOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncOpKind::Create => "create",
            SyncOpKind::Update => "update",
            SyncOpKind::Delete => "delete",
        };
        f.write_str(label)
    }
}

impl fmt::Display for SyncEntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncEntityKind::Transaction => "transaction",
            SyncEntityKind::Account => "account",
            SyncEntityKind::Category => "category",
        };
        f.write_str(label)
    }
}
