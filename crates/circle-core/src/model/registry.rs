//! Page registry rows.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Vertical;
use crate::normalize::de;

/// Registry page type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PageType {
    /// Locality guide.
    Locality,
    /// Event detail page.
    Event,
    /// Deal page.
    Deal,
    /// Any page type this service does not render itself.
    Other(String),
    /// Missing page type.
    #[default]
    Unknown,
}

impl PageType {
    /// Stored spelling.
    pub fn as_str(&self) -> &str {
        match self {
            PageType::Locality => "locality",
            PageType::Event => "event",
            PageType::Deal => "deal",
            PageType::Other(s) => s,
            PageType::Unknown => "",
        }
    }

    /// Vertical this page type dispatches to.
    pub fn vertical(&self) -> Option<Vertical> {
        match self {
            PageType::Locality => Some(Vertical::Locality),
            PageType::Event => Some(Vertical::Event),
            PageType::Deal => Some(Vertical::Deal),
            PageType::Other(_) | PageType::Unknown => None,
        }
    }
}

impl From<&str> for PageType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => PageType::Unknown,
            "locality" => PageType::Locality,
            "event" => PageType::Event,
            "deal" => PageType::Deal,
            other => PageType::Other(other.to_string()),
        }
    }
}

impl From<Vertical> for PageType {
    fn from(v: Vertical) -> Self {
        PageType::from(v.as_str())
    }
}

impl Serialize for PageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(PageType::from(de::string(deserializer)?.as_str()))
    }
}

/// Crawl directive stored on a registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    /// Crawlable (the default for anything but an explicit `noindex`).
    #[default]
    Index,
    /// Opted out of indexing.
    NoIndex,
}

impl IndexState {
    /// Stored spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexState::Index => "index",
            IndexState::NoIndex => "noindex",
        }
    }
}

impl From<&str> for IndexState {
    fn from(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("noindex") {
            IndexState::NoIndex
        } else {
            IndexState::Index
        }
    }
}

impl<'de> Deserialize<'de> for IndexState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(IndexState::from(de::string(deserializer)?.as_str()))
    }
}

/// A path → descriptor row of the page registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryEntry {
    /// Site-relative path, the unique key.
    #[serde(alias = "url_path", deserialize_with = "de::string")]
    pub path: String,
    /// Page type.
    pub page_type: PageType,
    /// Table holding the entity.
    #[serde(deserialize_with = "de::text")]
    pub entity_table: Option<String>,
    /// Entity primary key.
    #[serde(deserialize_with = "de::text")]
    pub entity_id: Option<String>,
    /// Entity natural key (slug).
    #[serde(deserialize_with = "de::text")]
    pub entity_key: Option<String>,
    /// Stored canonical URL.
    #[serde(deserialize_with = "de::text")]
    pub canonical_url: Option<String>,
    /// Crawl directive.
    pub index_state: IndexState,
    /// Stored page title.
    #[serde(deserialize_with = "de::text")]
    pub title: Option<String>,
    /// Last update timestamp.
    #[serde(deserialize_with = "de::text")]
    pub updated_at: Option<String>,
    /// Last publish timestamp.
    #[serde(deserialize_with = "de::text")]
    pub last_published_at: Option<String>,
}

impl RegistryEntry {
    /// Create a row for a path and page type.
    pub fn new(path: impl Into<String>, page_type: impl Into<PageType>) -> Self {
        Self {
            path: path.into(),
            page_type: page_type.into(),
            ..Self::default()
        }
    }

    /// Set the entity key.
    pub fn with_entity_key(mut self, key: impl Into<String>) -> Self {
        self.entity_key = Some(key.into());
        self
    }

    /// Set the canonical URL.
    pub fn with_canonical_url(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = Some(url.into());
        self
    }

    /// Set the index state.
    pub fn with_index_state(mut self, state: IndexState) -> Self {
        self.index_state = state;
        self
    }

    /// Vertical this row dispatches to, from the page type or else the table.
    pub fn vertical(&self) -> Option<Vertical> {
        self.page_type.vertical().or_else(|| {
            self.entity_table
                .as_deref()
                .and_then(Vertical::from_table)
        })
    }

    /// Stored canonical URL, if non-blank.
    pub fn canonical(&self) -> Option<&str> {
        self.canonical_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
