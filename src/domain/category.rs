//! Domain types representing transaction categories.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Id assigned when a legacy category reference cannot be resolved.
pub const CATEGORY_NOT_FOUND: &str = "category_not_found";

/// Classifies ledger activity for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub owner_id: String,
}

impl Category {
    /// Creates a user-owned category with a fresh id.
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        kind: CategoryKind,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            icon: icon.into(),
            color: String::from("#9E9E9E"),
            kind,
            owner_id: owner_id.into(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.owner_id == DEFAULT_OWNER
    }

    /// Whether a legacy lookup key refers to this category by name or icon.
    pub fn matches_key(&self, key: &str) -> bool {
        self.name == key || self.icon == key
    }
}

impl OwnedEntity for Category {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}

/// Supported category types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl From<Direction> for CategoryKind {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Income => CategoryKind::Income,
            Direction::Expense => CategoryKind::Expense,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryKind::Income => "Income",
            CategoryKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}
