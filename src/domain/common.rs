use std::fmt;

use serde::{Deserialize, Serialize};

/// Owner id carried by built-in catalog entries.
pub const DEFAULT_OWNER: &str = "default";

/// Entities that belong to a single tenant.
pub trait OwnedEntity {
    fn owner_id(&self) -> &str;

    fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id() == owner_id
    }
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Whether money flows into or out of an account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    /// Signed contribution of `amount` to a balance. The stored sign of the
    /// amount is ignored.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Direction::Income => amount.abs(),
            Direction::Expense => -amount.abs(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "income" | "in" | "+" => Some(Direction::Income),
            "expense" | "out" | "-" => Some(Direction::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Income => "Income",
            Direction::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Serializes an optional id as its string form, or `""` when absent.
pub mod empty_string_as_none {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S>(value: &Option<Uuid>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Uuid::parse_str(value)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use serde;
pub use uuid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_ignores_stored_sign() {
        assert_eq!(Direction::Income.signed(-40.0), 40.0);
        assert_eq!(Direction::Expense.signed(40.0), -40.0);
        assert_eq!(Direction::Expense.signed(-40.0), -40.0);
    }

    #[test]
    fn direction_serializes_uppercase() {
        let json = serde_json::to_string(&Direction::Income).unwrap();
        assert_eq!(json, "\"INCOME\"");
        let parsed: Direction = serde_json::from_str("\"EXPENSE\"").unwrap();
        assert_eq!(parsed, Direction::Expense);
    }
}
