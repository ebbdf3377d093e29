//! Versioned documents persisted by the ledger manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::ledger::LedgerState;
use crate::domain::common::empty_string_as_none;
use crate::domain::{Account, Transaction, UserProfile};
use crate::errors::{LedgerError, Result};

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Ledger state as stored under the state key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLedger {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default, with = "empty_string_as_none")]
    pub selected_account_id: Option<Uuid>,
}

impl PersistedLedger {
    pub fn from_state(state: &LedgerState) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            accounts: state.accounts.clone(),
            transactions: state.transactions.clone(),
            selected_account_id: state.selected_account_id,
        }
    }

    pub fn into_state(self) -> LedgerState {
        LedgerState {
            accounts: self.accounts,
            transactions: self.transactions,
            selected_account_id: self.selected_account_id,
        }
    }

    /// Parses a stored blob, refusing versions newer than this build knows.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        check_schema(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Portable backup of one user's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    pub profile: UserProfile,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl ExportDocument {
    pub fn new(
        profile: UserProfile,
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            exported_at,
            profile,
            accounts,
            transactions,
        }
    }

    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        check_schema(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

fn check_schema(value: &Value) -> Result<()> {
    let found = value
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if found > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(LedgerError::UnsupportedSchema {
            found: u32::try_from(found).unwrap_or(u32::MAX),
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    Ok(())
}
