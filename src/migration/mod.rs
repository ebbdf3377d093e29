//! One-shot conversion of old persisted blobs into current entities.
//!
//! Entry points are pure: they read a [`LegacyBlob`] plus the caller's
//! current user categories and return fresh entity lists with a report. They
//! never fail; unresolved category references receive the
//! [`CATEGORY_NOT_FOUND`](crate::domain::CATEGORY_NOT_FOUND) sentinel and
//! unusable records are skipped and reported.

pub mod legacy;
pub mod resolver;

pub use legacy::{LegacyBlob, LegacyBudget, LegacyCategory, LegacyTransaction};
pub use resolver::{CategoryResolver, Resolution};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Budget, Category, CategoryKind, Direction, Transaction};
use legacy::parse_timestamp;

/// Defaults applied to fields an old record does not carry.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Owner assigned to records without one.
    pub owner_id: String,
    /// Account assigned to transactions without a usable account id.
    pub fallback_account_id: Option<Uuid>,
    /// Timestamp used when a record carries none.
    pub now: DateTime<Utc>,
}

impl MigrationOptions {
    pub fn new(owner_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            owner_id: owner_id.into(),
            fallback_account_id: None,
            now,
        }
    }

    pub fn with_fallback_account(mut self, account_id: Uuid) -> Self {
        self.fallback_account_id = Some(account_id);
        self
    }
}

/// Counters and messages collected while migrating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    pub source_version: u32,
    pub migrated: usize,
    pub skipped: usize,
    pub unresolved_categories: usize,
    pub warnings: Vec<String>,
}

impl MigrationReport {
    fn merge(&mut self, other: MigrationReport) {
        self.migrated += other.migrated;
        self.skipped += other.skipped;
        self.unresolved_categories += other.unresolved_categories;
        self.warnings.extend(other.warnings);
    }
}

/// Migrated entities of one kind plus the report for them.
#[derive(Debug, Clone)]
pub struct Migrated<T> {
    pub items: Vec<T>,
    pub report: MigrationReport,
}

impl<T> Migrated<T> {
    fn new(source_version: u32) -> Self {
        Self {
            items: Vec::new(),
            report: MigrationReport {
                source_version,
                ..MigrationReport::default()
            },
        }
    }
}

/// Everything a legacy blob yields.
#[derive(Debug, Clone)]
pub struct LegacyMigration {
    pub user_categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub report: MigrationReport,
}

/// Converts the blob's custom categories.
pub fn migrate_user_categories(blob: &LegacyBlob, options: &MigrationOptions) -> Migrated<Category> {
    let mut out = Migrated::new(blob.version);
    for (index, legacy) in blob.user_categories.iter().enumerate() {
        let Some(name) = legacy.name.as_deref().map(str::trim).filter(|name| !name.is_empty())
        else {
            out.report.skipped += 1;
            out.report
                .warnings
                .push(format!("userCategories[{index}] has no name"));
            continue;
        };
        let kind = match legacy.kind.as_deref().and_then(Direction::parse) {
            Some(direction) => CategoryKind::from(direction),
            None => CategoryKind::Expense,
        };
        let mut category = Category::new(
            name,
            legacy.icon.clone().unwrap_or_default(),
            kind,
            legacy.owner_id.clone().unwrap_or_else(|| options.owner_id.clone()),
        );
        if let Some(id) = legacy.id.as_deref().filter(|id| !id.trim().is_empty()) {
            category.id = id.to_string();
        }
        if let Some(color) = legacy.color.clone() {
            category.color = color;
        }
        out.items.push(category);
        out.report.migrated += 1;
    }
    out
}

/// Converts the blob's transactions, linking each to a category id.
pub fn migrate_transactions(
    blob: &LegacyBlob,
    user_categories: &[Category],
    options: &MigrationOptions,
) -> Migrated<Transaction> {
    let resolver = CategoryResolver::new(user_categories);
    let mut out = Migrated::new(blob.version);

    for (index, legacy) in blob.transactions.iter().enumerate() {
        // The fallback only covers records that never named an account.
        let named = legacy
            .account_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty());
        let account_id = match named {
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => id,
                Err(_) => {
                    tracing::warn!(index, account_id = raw, "legacy account id is not a uuid");
                    out.report.skipped += 1;
                    out.report.warnings.push(format!(
                        "transactions[{index}] references unknown account `{raw}`"
                    ));
                    continue;
                }
            },
            None => match options.fallback_account_id {
                Some(id) => id,
                None => {
                    out.report.skipped += 1;
                    out.report
                        .warnings
                        .push(format!("transactions[{index}] has no account id"));
                    continue;
                }
            },
        };

        let direction = legacy
            .direction
            .as_deref()
            .and_then(Direction::parse)
            .unwrap_or_else(|| {
                if legacy.amount < 0.0 {
                    Direction::Expense
                } else {
                    Direction::Income
                }
            });

        let resolution = resolver.resolve(legacy.primary_key(), legacy.secondary_key());
        if !resolution.is_resolved() {
            out.report.unresolved_categories += 1;
        }

        let created_at = parse_timestamp(legacy.created_at.as_deref()).unwrap_or(options.now);
        let updated_at = parse_timestamp(legacy.updated_at.as_deref()).unwrap_or(created_at);
        let date = parse_timestamp(legacy.date.as_deref())
            .unwrap_or(created_at)
            .date_naive();

        let mut txn = Transaction::new(
            account_id,
            legacy.owner_id.clone().unwrap_or_else(|| options.owner_id.clone()),
            legacy.amount.abs(),
            direction,
            date,
            created_at,
        );
        if let Some(id) = legacy.id.as_deref().and_then(|raw| Uuid::parse_str(raw.trim()).ok()) {
            txn.id = id;
        }
        txn.description = legacy.description.clone().unwrap_or_default();
        txn.category_name = legacy.category_name.clone().or_else(|| legacy.category.clone());
        txn.category_icon_name = legacy.category_icon_name.clone();
        txn.category_id = Some(resolution.into_id());
        txn.updated_at = updated_at;
        txn.group_id = legacy.group_id.clone();

        out.items.push(txn);
        out.report.migrated += 1;
    }

    tracing::info!(
        migrated = out.report.migrated,
        skipped = out.report.skipped,
        unresolved = out.report.unresolved_categories,
        "legacy transactions migrated"
    );
    out
}

/// Converts the blob's budgets, linking each to a category id.
pub fn migrate_budgets(
    blob: &LegacyBlob,
    user_categories: &[Category],
    options: &MigrationOptions,
) -> Migrated<Budget> {
    let resolver = CategoryResolver::new(user_categories);
    let mut out = Migrated::new(blob.version);

    for legacy in &blob.budgets {
        let resolution = resolver.resolve(legacy.primary_key(), legacy.secondary_key());
        if !resolution.is_resolved() {
            out.report.unresolved_categories += 1;
        }
        let created_at = parse_timestamp(legacy.created_at.as_deref()).unwrap_or(options.now);
        out.items.push(Budget {
            id: legacy
                .id
                .as_deref()
                .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
                .unwrap_or_else(Uuid::new_v4),
            owner_id: legacy.owner_id.clone().unwrap_or_else(|| options.owner_id.clone()),
            name: legacy
                .name
                .clone()
                .or_else(|| legacy.category.clone())
                .unwrap_or_default(),
            amount: legacy.amount.abs(),
            category_id: resolution.into_id(),
            created_at,
            updated_at: parse_timestamp(legacy.updated_at.as_deref()).unwrap_or(created_at),
        });
        out.report.migrated += 1;
    }
    out
}

/// Runs every migration over one blob.
///
/// Custom categories found in the blob are appended to `current_categories`
/// (ids already present are kept as they are) before references are resolved,
/// so records can link to categories that only existed in the old data.
pub fn migrate_blob(
    blob: &LegacyBlob,
    current_categories: &[Category],
    options: &MigrationOptions,
) -> LegacyMigration {
    let mut report = MigrationReport {
        source_version: blob.version,
        warnings: blob.warnings.clone(),
        ..MigrationReport::default()
    };

    let migrated_categories = migrate_user_categories(blob, options);
    let mut user_categories = current_categories.to_vec();
    for category in migrated_categories.items {
        if !user_categories.iter().any(|existing| existing.id == category.id) {
            user_categories.push(category);
        }
    }
    report.merge(migrated_categories.report);

    let transactions = migrate_transactions(blob, &user_categories, options);
    report.merge(transactions.report);
    let budgets = migrate_budgets(blob, &user_categories, options);
    report.merge(budgets.report);

    LegacyMigration {
        user_categories,
        transactions: transactions.items,
        budgets: budgets.items,
        report,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::domain::CATEGORY_NOT_FOUND;

    fn options() -> MigrationOptions {
        MigrationOptions::new("u1", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn missing_transactions_field_yields_empty_list() {
        let blob = LegacyBlob::from_value(&json!({ "budgets": [] }));
        let migrated = migrate_transactions(&blob, &[], &options());
        assert!(migrated.items.is_empty());
        assert_eq!(migrated.report.migrated, 0);
    }

    #[test]
    fn transactions_without_account_use_fallback_or_are_skipped() {
        let blob = LegacyBlob::from_value(&json!({
            "transactions": [{ "amount": 5, "type": "EXPENSE", "categoryName": "Food" }]
        }));
        let skipped = migrate_transactions(&blob, &[], &options());
        assert!(skipped.items.is_empty());
        assert_eq!(skipped.report.skipped, 1);

        let fallback = Uuid::new_v4();
        let kept = migrate_transactions(&blob, &[], &options().with_fallback_account(fallback));
        assert_eq!(kept.items.len(), 1);
        assert_eq!(kept.items[0].account_id, fallback);
        assert_eq!(kept.items[0].category_id.as_deref(), Some("default_food"));
    }

    #[test]
    fn unparseable_account_id_is_skipped_not_rerouted() {
        let blob = LegacyBlob::from_value(&json!({
            "transactions": [{ "amount": 700, "type": "income", "accountId": "acc-savings-17" }]
        }));
        let fallback = Uuid::new_v4();
        let migrated =
            migrate_transactions(&blob, &[], &options().with_fallback_account(fallback));
        assert!(migrated.items.is_empty());
        assert_eq!(migrated.report.skipped, 1);
        assert_eq!(migrated.report.warnings.len(), 1);
        assert!(migrated.report.warnings[0].contains("acc-savings-17"));
    }

    #[test]
    fn unresolved_reference_gets_sentinel_and_batch_continues() {
        let account = Uuid::new_v4().to_string();
        let blob = LegacyBlob::from_value(&json!({
            "transactions": [
                { "accountId": account, "amount": 1, "type": "EXPENSE", "categoryName": "Unknown", "categoryIconName": "nope" },
                { "accountId": account, "amount": 2, "type": "EXPENSE", "categoryIconName": "cart" }
            ]
        }));
        let migrated = migrate_transactions(&blob, &[], &options());
        assert_eq!(migrated.items.len(), 2);
        assert_eq!(migrated.items[0].category_id.as_deref(), Some(CATEGORY_NOT_FOUND));
        assert_eq!(migrated.items[1].category_id.as_deref(), Some("default_groceries"));
        assert_eq!(migrated.report.unresolved_categories, 1);
    }

    #[test]
    fn direction_falls_back_to_amount_sign() {
        let account = Uuid::new_v4().to_string();
        let blob = LegacyBlob::from_value(&json!({
            "transactions": [{ "accountId": account, "amount": -40 }]
        }));
        let migrated = migrate_transactions(&blob, &[], &options());
        assert_eq!(migrated.items[0].direction, Direction::Expense);
        assert_eq!(migrated.items[0].amount, 40.0);
    }

    #[test]
    fn budgets_resolve_by_slug_then_icon() {
        let user = vec![Category::new("Dining", "restaurant", CategoryKind::Expense, "u1")];
        let blob = LegacyBlob::from_value(&json!({
            "budgets": [{ "category": "nothing-here", "categoryIconName": "restaurant", "limit": 300 }]
        }));
        let migrated = migrate_budgets(&blob, &user, &options());
        assert_eq!(migrated.items.len(), 1);
        assert_eq!(migrated.items[0].category_id, user[0].id);
        assert_eq!(migrated.items[0].amount, 300.0);
    }

    #[test]
    fn migrate_blob_links_to_categories_from_the_same_blob() {
        let account = Uuid::new_v4().to_string();
        let blob = LegacyBlob::from_value(&json!({
            "version": 1,
            "userCategories": [{ "id": "legacy-pets", "name": "Pets", "icon": "paw", "type": "EXPENSE" }],
            "transactions": [{ "accountId": account, "amount": 9, "type": "EXPENSE", "categoryIconName": "paw" }]
        }));
        let migration = migrate_blob(&blob, &[], &options());
        assert_eq!(migration.user_categories.len(), 1);
        assert_eq!(migration.transactions[0].category_id.as_deref(), Some("legacy-pets"));
        assert_eq!(migration.report.source_version, 1);
        assert_eq!(migration.report.migrated, 2);
    }

    #[test]
    fn nameless_legacy_category_is_skipped() {
        let blob = LegacyBlob::from_value(&json!({
            "userCategories": [{ "icon": "paw" }, { "name": "Kids", "type": "income" }]
        }));
        let migrated = migrate_user_categories(&blob, &options());
        assert_eq!(migrated.items.len(), 1);
        assert_eq!(migrated.items[0].kind, CategoryKind::Income);
        assert_eq!(migrated.items[0].owner_id, "u1");
        assert_eq!(migrated.report.skipped, 1);
    }

    #[test]
    fn categories_migrated_for_the_default_owner_are_not_builtin() {
        let blob = LegacyBlob::from_value(&json!({
            "userCategories": [{ "name": "Pets", "icon": "paw" }]
        }));
        let owner = crate::config::Config::default().owner_id;
        let options =
            MigrationOptions::new(owner, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let migrated = migrate_user_categories(&blob, &options);
        assert_eq!(migrated.items.len(), 1);
        assert!(!migrated.items[0].is_builtin());
    }
}
