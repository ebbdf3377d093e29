//! Default and user-defined categories.
//!
//! The default table is static and grouped; lookups use the flattened form.
//! User categories are supplied by the caller and searched before defaults.

mod defaults;

use once_cell::sync::Lazy;

use crate::domain::{Category, CategoryKind, OwnedEntity};

static FLATTENED_DEFAULTS: Lazy<Vec<Category>> = Lazy::new(|| {
    defaults::DEFAULT_GROUPS
        .iter()
        .flat_map(|group| group.to_categories())
        .collect()
});

/// Built-in categories in table order.
pub fn default_categories() -> &'static [Category] {
    &FLATTENED_DEFAULTS
}

/// Titles of the built-in groups with the categories each holds.
pub fn default_groups() -> Vec<(&'static str, Vec<Category>)> {
    defaults::DEFAULT_GROUPS
        .iter()
        .map(|group| (group.title, group.to_categories().collect()))
        .collect()
}

/// The built-in table plus one user's custom categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    user: Vec<Category>,
}

impl CategoryCatalog {
    pub fn new(user: Vec<Category>) -> Self {
        Self { user }
    }

    pub fn user_categories(&self) -> &[Category] {
        &self.user
    }

    pub fn defaults(&self) -> &'static [Category] {
        default_categories()
    }

    /// Adds a custom category, rejecting duplicate names of the same kind for
    /// that owner.
    pub fn add_user_category(&mut self, category: Category) -> bool {
        let duplicate = self.user.iter().any(|existing| {
            existing.owner_id == category.owner_id
                && existing.kind == category.kind
                && existing.name.trim().eq_ignore_ascii_case(category.name.trim())
        });
        if duplicate {
            tracing::warn!(name = %category.name, "duplicate user category ignored");
            return false;
        }
        self.user.push(category);
        true
    }

    pub fn remove_user_category(&mut self, id: &str) -> Option<Category> {
        let index = self.user.iter().position(|category| category.id == id)?;
        Some(self.user.remove(index))
    }

    /// User categories first, then defaults.
    pub fn all(&self) -> impl Iterator<Item = &Category> {
        self.user.iter().chain(default_categories().iter())
    }

    pub fn find(&self, id: &str) -> Option<&Category> {
        self.all().find(|category| category.id == id)
    }

    /// Categories visible to `owner_id`: their own plus every default.
    pub fn for_owner<'a>(&'a self, owner_id: &'a str) -> impl Iterator<Item = &'a Category> + 'a {
        self.user
            .iter()
            .filter(move |category| category.is_owned_by(owner_id))
            .chain(default_categories().iter())
    }

    pub fn by_kind(&self, kind: CategoryKind) -> Vec<&Category> {
        self.all().filter(|category| category.kind == kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::DEFAULT_OWNER;

    #[test]
    fn flattened_defaults_have_unique_ids_and_default_owner() {
        let defaults = default_categories();
        assert!(!defaults.is_empty());
        let ids: HashSet<_> = defaults.iter().map(|category| category.id.as_str()).collect();
        assert_eq!(ids.len(), defaults.len());
        assert!(defaults.iter().all(|category| category.owner_id == DEFAULT_OWNER));
    }

    #[test]
    fn flattening_preserves_group_order() {
        let flattened: Vec<String> = default_groups()
            .into_iter()
            .flat_map(|(_, categories)| categories.into_iter().map(|category| category.id))
            .collect();
        let direct: Vec<String> = default_categories().iter().map(|c| c.id.clone()).collect();
        assert_eq!(flattened, direct);
    }

    #[test]
    fn user_categories_are_listed_first() {
        let mut catalog = CategoryCatalog::default();
        let custom = Category::new("Pets", "paw", CategoryKind::Expense, "u1");
        assert!(catalog.add_user_category(custom.clone()));
        assert_eq!(catalog.all().next().map(|c| c.id.clone()), Some(custom.id));
    }

    #[test]
    fn duplicate_user_category_is_rejected() {
        let mut catalog = CategoryCatalog::default();
        assert!(catalog.add_user_category(Category::new("Pets", "paw", CategoryKind::Expense, "u1")));
        assert!(!catalog.add_user_category(Category::new(" pets ", "dog", CategoryKind::Expense, "u1")));
        assert!(catalog.add_user_category(Category::new("Pets", "paw", CategoryKind::Expense, "u2")));
    }

    #[test]
    fn owner_view_hides_other_users() {
        let mut catalog = CategoryCatalog::default();
        catalog.add_user_category(Category::new("Mine", "star", CategoryKind::Expense, "u1"));
        catalog.add_user_category(Category::new("Theirs", "star", CategoryKind::Expense, "u2"));
        let names: Vec<_> = catalog.for_owner("u1").map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"Mine"));
        assert!(!names.contains(&"Theirs"));
        assert!(names.contains(&"Food"));
    }
}
