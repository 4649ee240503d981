//! Read-only port to the external content store.
//!
//! The store owns every row; this crate only reads. Implementations return
//! `Ok(None)` for an absent row and reserve `Err` for transport or query
//! failures, which callers must not treat as "not found".

mod memory;

pub use memory::{Fixtures, MemoryStore};

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{
    DealEntity, EventEntity, LocalityEntity, LocalitySummary, PageType, RegistryEntry,
};

/// Tables behind the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Registry,
    Localities,
    Events,
    Deals,
}

impl Table {
    /// Stored table name.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Registry => "page_registry",
            Table::Localities => "localities",
            Table::Events => "events",
            Table::Deals => "deals",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a single entity is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// Exact slug.
    Slug(&'a str),
    /// Primary key.
    Id(&'a str),
    /// Case-insensitive exact display name.
    Name(&'a str),
}

/// Sort order for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOrder {
    /// Soonest first.
    #[default]
    StartAscending,
    /// Latest first.
    StartDescending,
}

/// Locality scope of an event listing.
///
/// Event rows carry the locality as free text, so a row matches when its
/// text equals the name case-insensitively or slugifies to the slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalityFilter {
    pub slug: String,
    pub name: String,
}

/// Event listing query. Only visible events are ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventQuery {
    /// Category key.
    pub category: Option<String>,
    /// Locality scope.
    pub locality: Option<LocalityFilter>,
    /// RFC 3339 lower bound on the start date.
    pub starts_after: Option<String>,
    /// Sort order.
    pub order: EventOrder,
    /// Maximum rows.
    pub limit: usize,
}

impl EventQuery {
    /// Unfiltered listing of up to `limit` events.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Restrict to a category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to a locality.
    pub fn with_locality(mut self, slug: impl Into<String>, name: impl Into<String>) -> Self {
        self.locality = Some(LocalityFilter {
            slug: slug.into(),
            name: name.into(),
        });
        self
    }

    /// Only events starting at or after `instant`.
    pub fn starting_after(mut self, instant: impl Into<String>) -> Self {
        self.starts_after = Some(instant.into());
        self
    }

    /// Set the sort order.
    pub fn with_order(mut self, order: EventOrder) -> Self {
        self.order = order;
        self
    }
}

/// Deal listing query, most recently updated first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DealQuery {
    /// Category key.
    pub category: Option<String>,
    /// Locality scope, matched like [`EventQuery::locality`].
    pub locality: Option<LocalityFilter>,
    /// Maximum rows.
    pub limit: usize,
}

impl DealQuery {
    /// Unfiltered listing of up to `limit` deals.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Restrict to a category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to a locality.
    pub fn with_locality(mut self, slug: impl Into<String>, name: impl Into<String>) -> Self {
        self.locality = Some(LocalityFilter {
            slug: slug.into(),
            name: name.into(),
        });
        self
    }
}

/// Read-only access to the page registry and the vertical tables.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Registry row for an exact path.
    async fn registry_entry(&self, path: &str) -> StoreResult<Option<RegistryEntry>>;

    /// Indexable registry rows of a page type, most recently updated first.
    async fn registry_entries(
        &self,
        page_type: &PageType,
        limit: usize,
    ) -> StoreResult<Vec<RegistryEntry>>;

    /// A single locality.
    async fn locality(&self, lookup: Lookup<'_>) -> StoreResult<Option<LocalityEntity>>;

    /// Localities ordered by name.
    async fn localities(&self, limit: usize) -> StoreResult<Vec<LocalitySummary>>;

    /// A single visible event.
    async fn event(&self, lookup: Lookup<'_>) -> StoreResult<Option<EventEntity>>;

    /// Visible events.
    async fn events(&self, query: &EventQuery) -> StoreResult<Vec<EventEntity>>;

    /// A single deal.
    async fn deal(&self, lookup: Lookup<'_>) -> StoreResult<Option<DealEntity>>;

    /// Deals.
    async fn deals(&self, query: &DealQuery) -> StoreResult<Vec<DealEntity>>;
}
