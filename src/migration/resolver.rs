//! Maps legacy category references onto category ids.

use crate::catalog;
use crate::domain::{Category, CATEGORY_NOT_FOUND};

/// Which tier of the fallback chain produced a category id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    User(String),
    Default(String),
    NotFound,
}

impl Resolution {
    pub fn id(&self) -> &str {
        match self {
            Resolution::User(id) | Resolution::Default(id) => id,
            Resolution::NotFound => CATEGORY_NOT_FOUND,
        }
    }

    pub fn into_id(self) -> String {
        match self {
            Resolution::User(id) | Resolution::Default(id) => id,
            Resolution::NotFound => CATEGORY_NOT_FOUND.to_string(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }
}

/// Resolves a pair of legacy lookup keys.
///
/// Order is fixed: user categories with the primary key, user categories with
/// the secondary key, then the flattened defaults in the same key order. A
/// category matches a key when its name or its icon equals it. The first hit
/// wins; no hit yields [`CATEGORY_NOT_FOUND`].
#[derive(Debug, Clone, Copy)]
pub struct CategoryResolver<'a> {
    user: &'a [Category],
    defaults: &'a [Category],
}

impl<'a> CategoryResolver<'a> {
    pub fn new(user: &'a [Category]) -> Self {
        Self::with_defaults(user, catalog::default_categories())
    }

    pub fn with_defaults(user: &'a [Category], defaults: &'a [Category]) -> Self {
        Self { user, defaults }
    }

    pub fn resolve(&self, primary: Option<&str>, secondary: Option<&str>) -> Resolution {
        let keys: Vec<&str> = [primary, secondary]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .collect();

        if let Some(found) = first_match(self.user, &keys) {
            return Resolution::User(found.id.clone());
        }
        if let Some(found) = first_match(self.defaults, &keys) {
            return Resolution::Default(found.id.clone());
        }
        Resolution::NotFound
    }
}

fn first_match<'c>(categories: &'c [Category], keys: &[&str]) -> Option<&'c Category> {
    keys.iter()
        .find_map(|key| categories.iter().find(|category| category.matches_key(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryKind, DEFAULT_OWNER};

    fn category(id: &str, name: &str, icon: &str, owner: &str) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            color: "#000000".into(),
            kind: CategoryKind::Expense,
            owner_id: owner.into(),
        }
    }

    fn defaults() -> Vec<Category> {
        vec![
            category("default_food", "Food", "restaurant", DEFAULT_OWNER),
            category("default_taxi", "Taxi", "car", DEFAULT_OWNER),
        ]
    }

    #[test]
    fn user_category_beats_default_with_same_key() {
        let user = vec![category("u_food", "Food", "burger", "u1")];
        let defaults = defaults();
        let resolver = CategoryResolver::with_defaults(&user, &defaults);
        assert_eq!(
            resolver.resolve(Some("Food"), None),
            Resolution::User("u_food".into())
        );
    }

    #[test]
    fn user_secondary_key_beats_default_primary_key() {
        let user = vec![category("u_car", "My Car", "car", "u1")];
        let defaults = defaults();
        let resolver = CategoryResolver::with_defaults(&user, &defaults);
        // "Taxi" only exists in defaults, "car" is the icon of a user category.
        assert_eq!(
            resolver.resolve(Some("Taxi"), Some("car")),
            Resolution::User("u_car".into())
        );
    }

    #[test]
    fn primary_key_beats_secondary_within_a_tier() {
        let user = vec![
            category("u_a", "Alpha", "star", "u1"),
            category("u_b", "Beta", "moon", "u1"),
        ];
        let resolver = CategoryResolver::with_defaults(&user, &[]);
        assert_eq!(
            resolver.resolve(Some("moon"), Some("Alpha")),
            Resolution::User("u_b".into())
        );
    }

    #[test]
    fn first_listed_category_wins_for_the_same_key() {
        let user = vec![
            category("u_first", "Snacks", "cookie", "u1"),
            category("u_second", "cookie", "other", "u1"),
        ];
        let resolver = CategoryResolver::with_defaults(&user, &[]);
        assert_eq!(resolver.resolve(Some("cookie"), None).id(), "u_first");
    }

    #[test]
    fn falls_back_to_defaults_by_icon() {
        let defaults = defaults();
        let resolver = CategoryResolver::with_defaults(&[], &defaults);
        assert_eq!(
            resolver.resolve(None, Some("restaurant")),
            Resolution::Default("default_food".into())
        );
    }

    #[test]
    fn unmatched_or_empty_keys_yield_sentinel() {
        let defaults = defaults();
        let resolver = CategoryResolver::with_defaults(&[], &defaults);
        let missing = resolver.resolve(Some("Spaceships"), Some("rocket"));
        assert_eq!(missing, Resolution::NotFound);
        assert_eq!(missing.into_id(), CATEGORY_NOT_FOUND);
        assert_eq!(resolver.resolve(Some("  "), None).id(), CATEGORY_NOT_FOUND);
        assert_eq!(resolver.resolve(None, None).id(), CATEGORY_NOT_FOUND);
    }

    #[test]
    fn shipped_defaults_are_used_by_new() {
        let resolver = CategoryResolver::new(&[]);
        assert!(resolver.resolve(Some("Groceries"), None).is_resolved());
    }
}
