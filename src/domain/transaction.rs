//! Domain models for ledger transactions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A single income or expense entry booked against one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub owner_id: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub direction: Direction,
    /// Legacy denormalized category reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_icon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        owner_id: impl Into<String>,
        amount: f64,
        direction: Direction,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            owner_id: owner_id.into(),
            description: String::new(),
            amount,
            direction,
            category_name: None,
            category_icon_name: None,
            category_id: None,
            date,
            created_at: now,
            updated_at: now,
            group_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Contribution of this transaction to its account's balance.
    pub fn signed_amount(&self) -> f64 {
        self.direction.signed(self.amount)
    }
}

impl OwnedEntity for Transaction {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!(
            "txn:{} {} {:.2} [{}]",
            self.id, self.date, self.signed_amount(), self.direction
        )
    }
}

/// Partial update applied by `LedgerStore::update_transaction`. Unset fields
/// keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub account_id: Option<Uuid>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub direction: Option<Direction>,
    pub category_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub group_id: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply_to(self, txn: &mut Transaction, now: DateTime<Utc>) {
        if let Some(account_id) = self.account_id {
            txn.account_id = account_id;
        }
        if let Some(description) = self.description {
            txn.description = description;
        }
        if let Some(amount) = self.amount {
            txn.amount = amount;
        }
        if let Some(direction) = self.direction {
            txn.direction = direction;
        }
        if let Some(category_id) = self.category_id {
            txn.category_id = Some(category_id);
        }
        if let Some(date) = self.date {
            txn.date = date;
        }
        if let Some(group_id) = self.group_id {
            txn.group_id = Some(group_id);
        }
        txn.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        let now = Utc::now();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        Transaction::new(Uuid::new_v4(), "user-1", 25.0, Direction::Expense, date, now)
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut txn = sample().with_description("Lunch");
        let patch = TransactionPatch {
            amount: Some(30.0),
            ..TransactionPatch::default()
        };
        patch.apply_to(&mut txn, Utc::now());
        assert_eq!(txn.amount, 30.0);
        assert_eq!(txn.description, "Lunch");
        assert_eq!(txn.direction, Direction::Expense);
    }

    #[test]
    fn serializes_camel_case_fields() {
        let txn = sample().with_category_id("default_food");
        let json = serde_json::to_value(&txn).unwrap();
        assert!(json.get("accountId").is_some());
        assert_eq!(json["categoryId"], "default_food");
        assert!(json.get("groupId").is_none());
    }
}
