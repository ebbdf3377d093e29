//! Tolerant decoding of blobs written by older app versions.
//!
//! Every top-level field is decoded on its own. A field that is missing or has
//! the wrong shape becomes an empty list plus a warning, and each record inside
//! a list is decoded independently so one malformed entry only drops itself.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Schema version assumed when a blob carries no version tag.
pub const UNVERSIONED: u32 = 0;

/// Decoded view of an old persisted blob.
#[derive(Debug, Clone, Default)]
pub struct LegacyBlob {
    pub version: u32,
    pub transactions: Vec<LegacyTransaction>,
    pub budgets: Vec<LegacyBudget>,
    pub user_categories: Vec<LegacyCategory>,
    pub warnings: Vec<String>,
}

impl LegacyBlob {
    /// Parses raw JSON. Unparseable input yields an empty blob with a warning.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                tracing::warn!(error = %err, "legacy blob is not valid JSON");
                Self {
                    warnings: vec![format!("blob is not valid JSON: {err}")],
                    ..Self::default()
                }
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let mut warnings = Vec::new();
        if !value.is_object() {
            warnings.push("blob is not a JSON object".to_string());
        }
        let version = value
            .get("version")
            .or_else(|| value.get("schemaVersion"))
            .and_then(Value::as_u64)
            .map(|raw| u32::try_from(raw).unwrap_or(u32::MAX))
            .unwrap_or(UNVERSIONED);

        let transactions = decode_list(value, &["transactions"], &mut warnings);
        let budgets = decode_list(value, &["budgets"], &mut warnings);
        let user_categories =
            decode_list(value, &["userCategories", "user_categories"], &mut warnings);

        Self {
            version,
            transactions,
            budgets,
            user_categories,
            warnings,
        }
    }
}

fn decode_list<T: DeserializeOwned>(
    value: &Value,
    names: &[&str],
    warnings: &mut Vec<String>,
) -> Vec<T> {
    let Some((name, field)) = names
        .iter()
        .find_map(|name| value.get(*name).map(|field| (*name, field)))
    else {
        return Vec::new();
    };
    let Some(entries) = field.as_array() else {
        if !field.is_null() {
            warnings.push(format!("`{name}` is not a list; ignored"));
        }
        return Vec::new();
    };
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::deserialize(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(field = name, index, error = %err, "skipping malformed legacy record");
                warnings.push(format!("`{name}[{index}]` skipped: {err}"));
                None
            }
        })
        .collect()
}

/// Transaction as stored before categories were referenced by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyTransaction {
    pub id: Option<String>,
    pub account_id: Option<String>,
    #[serde(alias = "userId")]
    pub owner_id: Option<String>,
    #[serde(alias = "title", alias = "note")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(alias = "type")]
    pub direction: Option<String>,
    /// Category slug used by the oldest schema.
    pub category: Option<String>,
    pub category_name: Option<String>,
    pub category_icon_name: Option<String>,
    pub category_id: Option<String>,
    pub date: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub group_id: Option<String>,
}

impl LegacyTransaction {
    /// Primary lookup key: the slug when present, otherwise the stored name.
    pub fn primary_key(&self) -> Option<&str> {
        non_empty(self.category.as_deref()).or_else(|| non_empty(self.category_name.as_deref()))
    }

    pub fn secondary_key(&self) -> Option<&str> {
        non_empty(self.category_icon_name.as_deref())
    }
}

/// Budget as stored before categories were referenced by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyBudget {
    pub id: Option<String>,
    #[serde(alias = "userId")]
    pub owner_id: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "limit", deserialize_with = "lenient_amount")]
    pub amount: f64,
    pub category: Option<String>,
    #[serde(alias = "iconName", alias = "icon")]
    pub category_icon_name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl LegacyBudget {
    pub fn primary_key(&self) -> Option<&str> {
        non_empty(self.category.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    pub fn secondary_key(&self) -> Option<&str> {
        non_empty(self.category_icon_name.as_deref())
    }
}

/// User-created category from an old blob.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyCategory {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "iconName")]
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<String>,
    #[serde(alias = "userId")]
    pub owner_id: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Accepts numbers and numeric strings; anything else becomes zero.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Parses RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = non_empty(raw)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_decode_to_empty_lists() {
        let blob = LegacyBlob::from_value(&json!({}));
        assert_eq!(blob.version, UNVERSIONED);
        assert!(blob.transactions.is_empty());
        assert!(blob.budgets.is_empty());
        assert!(blob.user_categories.is_empty());
        assert!(blob.warnings.is_empty());
    }

    #[test]
    fn wrong_shape_degrades_only_that_field() {
        let blob = LegacyBlob::from_value(&json!({
            "version": 2,
            "transactions": "oops",
            "budgets": [{ "amount": 100, "category": "food" }]
        }));
        assert_eq!(blob.version, 2);
        assert!(blob.transactions.is_empty());
        assert_eq!(blob.budgets.len(), 1);
        assert_eq!(blob.warnings.len(), 1);
    }

    #[test]
    fn oversized_version_saturates() {
        let blob = LegacyBlob::from_value(&json!({ "version": 4_294_967_297u64 }));
        assert_eq!(blob.version, u32::MAX);
    }

    #[test]
    fn malformed_record_is_skipped_individually() {
        let blob = LegacyBlob::from_value(&json!({
            "transactions": [
                { "amount": 10, "type": "EXPENSE" },
                42,
                { "amount": "12.5", "type": "INCOME" }
            ]
        }));
        assert_eq!(blob.transactions.len(), 2);
        assert_eq!(blob.transactions[1].amount, 12.5);
        assert_eq!(blob.warnings.len(), 1);
    }

    #[test]
    fn invalid_json_never_panics() {
        let blob = LegacyBlob::from_json("{ not json");
        assert!(blob.transactions.is_empty());
        assert_eq!(blob.warnings.len(), 1);
    }

    #[test]
    fn primary_key_prefers_slug_over_name() {
        let txn = LegacyTransaction {
            category: Some("food".into()),
            category_name: Some("Food".into()),
            category_icon_name: Some("restaurant".into()),
            ..LegacyTransaction::default()
        };
        assert_eq!(txn.primary_key(), Some("food"));
        assert_eq!(txn.secondary_key(), Some("restaurant"));

        let named = LegacyTransaction {
            category: Some(" ".into()),
            category_name: Some("Food".into()),
            ..LegacyTransaction::default()
        };
        assert_eq!(named.primary_key(), Some("Food"));
    }

    #[test]
    fn timestamps_accept_dates_and_rfc3339() {
        assert!(parse_timestamp(Some("2023-04-05")).is_some());
        assert!(parse_timestamp(Some("2023-04-05T10:11:12Z")).is_some());
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
