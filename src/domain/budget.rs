use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Spending limit attached to one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub owner_id: String,
    #[serde(default)]
    pub name: String,
    pub amount: f64,
    pub category_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedEntity for Budget {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl NamedEntity for Budget {
    fn name(&self) -> &str {
        &self.name
    }
}
