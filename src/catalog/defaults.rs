//! Built-in category table shipped with the app.

use crate::domain::{Category, CategoryKind, DEFAULT_OWNER};

pub(crate) struct DefaultCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// A titled group of built-in categories sharing one kind.
pub(crate) struct DefaultGroup {
    pub title: &'static str,
    pub kind: CategoryKind,
    pub categories: &'static [DefaultCategory],
}

macro_rules! default_category {
    ($id:literal, $name:literal, $icon:literal, $color:literal) => {
        DefaultCategory {
            id: $id,
            name: $name,
            icon: $icon,
            color: $color,
        }
    };
}

pub(crate) static DEFAULT_GROUPS: &[DefaultGroup] = &[
    DefaultGroup {
        title: "Food & Drinks",
        kind: CategoryKind::Expense,
        categories: &[
            default_category!("default_food", "Food", "restaurant", "#FF7043"),
            default_category!("default_groceries", "Groceries", "cart", "#8BC34A"),
            default_category!("default_coffee", "Coffee", "coffee", "#795548"),
        ],
    },
    DefaultGroup {
        title: "Transport",
        kind: CategoryKind::Expense,
        categories: &[
            default_category!("default_transport", "Transport", "bus", "#42A5F5"),
            default_category!("default_fuel", "Fuel", "gas-station", "#607D8B"),
            default_category!("default_taxi", "Taxi", "car", "#FFCA28"),
        ],
    },
    DefaultGroup {
        title: "Home",
        kind: CategoryKind::Expense,
        categories: &[
            default_category!("default_rent", "Rent", "home", "#5C6BC0"),
            default_category!("default_utilities", "Utilities", "flash", "#FFA726"),
            default_category!("default_internet", "Internet", "wifi", "#26C6DA"),
        ],
    },
    DefaultGroup {
        title: "Lifestyle",
        kind: CategoryKind::Expense,
        categories: &[
            default_category!("default_health", "Health", "medkit", "#EF5350"),
            default_category!("default_shopping", "Shopping", "bag", "#AB47BC"),
            default_category!("default_entertainment", "Entertainment", "film", "#EC407A"),
            default_category!("default_education", "Education", "school", "#7E57C2"),
            default_category!("default_travel", "Travel", "airplane", "#29B6F6"),
            default_category!("default_other_expense", "Other", "ellipsis-horizontal", "#9E9E9E"),
        ],
    },
    DefaultGroup {
        title: "Income",
        kind: CategoryKind::Income,
        categories: &[
            default_category!("default_salary", "Salary", "cash", "#66BB6A"),
            default_category!("default_freelance", "Freelance", "briefcase", "#26A69A"),
            default_category!("default_investments", "Investments", "trending-up", "#9CCC65"),
            default_category!("default_gifts", "Gifts", "gift", "#D4E157"),
            default_category!("default_other_income", "Other Income", "add-circle", "#BDBDBD"),
        ],
    },
];

impl DefaultGroup {
    pub(crate) fn to_categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.iter().map(move |entry| Category {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            icon: entry.icon.to_string(),
            color: entry.color.to_string(),
            kind: self.kind,
            owner_id: DEFAULT_OWNER.to_string(),
        })
    }
}
