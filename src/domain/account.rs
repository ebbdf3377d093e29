use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A money container owned by one user. `balance` is derived from the
/// transactions that reference the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub balance: f64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Builds a zero-balance account stamped with `now`.
    pub fn new(input: NewAccount, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            account_type: input.account_type,
            balance: 0.0,
            owner_id: input.owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedEntity for Account {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("{} ({}) {:.2}", self.name, self.account_type, self.balance)
    }
}

/// Caller-supplied fields for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub account_type: String,
    pub owner_id: String,
}

impl NewAccount {
    pub fn new(
        name: impl Into<String>,
        account_type: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            account_type: account_type.into(),
            owner_id: owner_id.into(),
        }
    }
}
