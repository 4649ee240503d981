//! Deal records.

use serde::{Deserialize, Serialize};

use crate::normalize::{de, titleize};

/// A merchant offer, keyed by category and locality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealEntity {
    #[serde(deserialize_with = "de::text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "de::string")]
    pub slug: String,
    #[serde(deserialize_with = "de::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub locality: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub meta_title: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub meta_description: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub updated_at: Option<String>,
}

impl DealEntity {
    /// Create a deal with a slug, title and category.
    pub fn new(slug: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: Some(title.into()),
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Title, else the slug title-cased.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| titleize(&self.slug))
    }
}
