//! Static facet catalogs.

use serde::Serialize;

use super::Vertical;
use crate::normalize::titleize;

/// A browseable category of a vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    /// Path token.
    pub key: &'static str,
    /// Display label.
    pub label: &'static str,
}

impl Category {
    const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Event categories.
pub const EVENT_CATEGORIES: &[Category] = &[
    Category::new("music", "Music"),
    Category::new("festival", "Festivals"),
    Category::new("food", "Food & Dining"),
    Category::new("comedy", "Comedy"),
    Category::new("workshop", "Workshops"),
    Category::new("sports", "Sports"),
    Category::new("kids", "Kids & Family"),
    Category::new("art", "Art & Culture"),
    Category::new("nightlife", "Nightlife"),
];

/// Deal categories.
pub const DEAL_CATEGORIES: &[Category] = &[
    Category::new("restaurants", "Restaurants"),
    Category::new("cafes", "Cafes"),
    Category::new("shopping", "Shopping"),
    Category::new("salons", "Salons"),
    Category::new("gyms", "Gyms"),
    Category::new("event-tickets", "Event Tickets"),
];

/// The static dimensions a vertical can be browsed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetCatalog {
    /// Categories, in display order.
    pub categories: &'static [Category],
    /// Whether collection pages can be scoped to a locality.
    pub locality_scoped: bool,
}

impl FacetCatalog {
    /// Catalog of a vertical.
    pub fn for_vertical(vertical: Vertical) -> Self {
        match vertical {
            Vertical::Event => Self {
                categories: EVENT_CATEGORIES,
                locality_scoped: true,
            },
            Vertical::Deal => Self {
                categories: DEAL_CATEGORIES,
                locality_scoped: true,
            },
            Vertical::Locality => Self {
                categories: &[],
                locality_scoped: false,
            },
        }
    }

    /// Category by path token, case-insensitively.
    pub fn category(&self, key: &str) -> Option<&'static Category> {
        let key = key.trim();
        self.categories
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(key))
    }

    /// Display label for a stored category value, known or not.
    pub fn label_for(&self, value: &str) -> String {
        match self.category(value) {
            Some(category) => category.label.to_string(),
            None => titleize(value.trim()),
        }
    }
}
