//! Vertical fetchers.
//!
//! Thin, bounded reads over a [`ContentStore`]. Each call is wrapped in a
//! timeout and re-checks the invariants the rest of the crate relies on
//! (visibility of events, non-empty slugs), so a misbehaving store
//! implementation cannot leak hidden rows into pages or sitemaps.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DEFAULT_READ_TIMEOUT;
use crate::error::{StoreError, StoreResult};
use crate::model::{
    DealEntity, EventEntity, LocalityEntity, LocalitySummary, PageType, RegistryEntry,
};
use crate::normalize::{looks_like_slug, slugify};
use crate::store::{ContentStore, DealQuery, EventQuery, Lookup};

/// Bounded, read-only access to every vertical.
#[derive(Clone)]
pub struct Fetchers {
    store: Arc<dyn ContentStore>,
    read_timeout: Duration,
}

impl Fetchers {
    /// Wrap a store with the default read timeout.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the per-read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// The per-read timeout.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    async fn bounded<T, F>(&self, read: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.read_timeout, read).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.read_timeout)),
        }
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Registry row for an exact path.
    pub async fn registry_entry(&self, path: &str) -> StoreResult<Option<RegistryEntry>> {
        self.bounded(self.store.registry_entry(path)).await
    }

    /// Indexable registry rows of a page type.
    pub async fn registry_entries(
        &self,
        page_type: &PageType,
        limit: usize,
    ) -> StoreResult<Vec<RegistryEntry>> {
        let rows = self
            .bounded(self.store.registry_entries(page_type, limit))
            .await?;
        Ok(rows
            .into_iter()
            .filter(|r| !r.path.is_empty() && &r.page_type == page_type)
            .take(limit)
            .collect())
    }

    // ------------------------------------------------------------------
    // Localities
    // ------------------------------------------------------------------

    /// Locality by slug.
    pub async fn locality_by_slug(&self, slug: &str) -> StoreResult<Option<LocalityEntity>> {
        self.bounded(self.store.locality(Lookup::Slug(slug))).await
    }

    /// Locality by primary key.
    pub async fn locality_by_id(&self, id: &str) -> StoreResult<Option<LocalityEntity>> {
        self.bounded(self.store.locality(Lookup::Id(id))).await
    }

    /// Locality by case-insensitive display name.
    pub async fn locality_by_name(&self, name: &str) -> StoreResult<Option<LocalityEntity>> {
        self.bounded(self.store.locality(Lookup::Name(name))).await
    }

    /// Localities ordered by name, at most `limit`.
    pub async fn localities(&self, limit: usize) -> StoreResult<Vec<LocalitySummary>> {
        let rows = self.bounded(self.store.localities(limit)).await?;
        Ok(rows
            .into_iter()
            .filter(|l| !l.slug.is_empty())
            .take(limit)
            .collect())
    }

    /// Match an event's free-text locality to a canonical locality.
    ///
    /// Slug heuristic first (the text as-is when it already looks like a
    /// slug, otherwise slugified), then an exact case-insensitive name
    /// lookup. Best effort: a miss or a failed read yields `None`.
    pub async fn match_locality(&self, free_text: &str) -> Option<LocalitySummary> {
        let text = free_text.trim();
        if text.is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();
        let candidate = if looks_like_slug(&lowered) {
            lowered
        } else {
            slugify(text)
        };

        if !candidate.is_empty() {
            match self.locality_by_slug(&candidate).await {
                Ok(Some(locality)) => return Some(LocalitySummary::from(&locality)),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(locality = %text, error = %e, "locality slug match failed");
                    return None;
                }
            }
        }

        match self.locality_by_name(text).await {
            Ok(found) => found.as_ref().map(LocalitySummary::from),
            Err(e) => {
                tracing::debug!(locality = %text, error = %e, "locality name match failed");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Visible event by slug.
    pub async fn event_by_slug(&self, slug: &str) -> StoreResult<Option<EventEntity>> {
        let event = self.bounded(self.store.event(Lookup::Slug(slug))).await?;
        Ok(event.filter(|e| e.status.is_visible()))
    }

    /// Visible event by primary key.
    pub async fn event_by_id(&self, id: &str) -> StoreResult<Option<EventEntity>> {
        let event = self.bounded(self.store.event(Lookup::Id(id))).await?;
        Ok(event.filter(|e| e.status.is_visible()))
    }

    /// Visible events matching a query.
    pub async fn events(&self, query: &EventQuery) -> StoreResult<Vec<EventEntity>> {
        let rows = self.bounded(self.store.events(query)).await?;
        Ok(rows
            .into_iter()
            .filter(|e| e.status.is_visible() && !e.slug.is_empty())
            .take(query.limit)
            .collect())
    }

    // ------------------------------------------------------------------
    // Deals
    // ------------------------------------------------------------------

    /// Deal by slug.
    pub async fn deal_by_slug(&self, slug: &str) -> StoreResult<Option<DealEntity>> {
        self.bounded(self.store.deal(Lookup::Slug(slug))).await
    }

    /// Deal by primary key.
    pub async fn deal_by_id(&self, id: &str) -> StoreResult<Option<DealEntity>> {
        self.bounded(self.store.deal(Lookup::Id(id))).await
    }

    /// Deals matching a query.
    pub async fn deals(&self, query: &DealQuery) -> StoreResult<Vec<DealEntity>> {
        let rows = self.bounded(self.store.deals(query)).await?;
        Ok(rows
            .into_iter()
            .filter(|d| !d.slug.is_empty())
            .take(query.limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventStatus;
    use crate::store::{MemoryStore, Table};

    fn fetchers(store: MemoryStore) -> Fetchers {
        Fetchers::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_absent_is_none_and_failure_is_error() {
        let f = fetchers(MemoryStore::new());
        assert!(f.locality_by_slug("nowhere").await.unwrap().is_none());
        assert!(f.event_by_slug("nothing").await.unwrap().is_none());
        assert!(f.deal_by_slug("nothing").await.unwrap().is_none());

        let f = fetchers(MemoryStore::new().with_outage(Table::Deals));
        assert!(matches!(
            f.deal_by_slug("x").await,
            Err(StoreError::Query(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_are_bounded() {
        let f = fetchers(MemoryStore::new().with_latency(Duration::from_millis(200)))
            .with_read_timeout(Duration::from_millis(5));
        let err = f.locality_by_slug("x").await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_by_id() {
        let mut locality = LocalityEntity::new("bani-park", "Bani Park");
        locality.id = Some("7".into());
        let mut event = EventEntity::new("e", "E");
        event.id = Some("9".into());
        let mut hidden = EventEntity::new("h", "H");
        hidden.id = Some("10".into());
        hidden.status = EventStatus::Cancelled;
        let f = fetchers(
            MemoryStore::new()
                .with_locality(locality)
                .with_event(event)
                .with_event(hidden),
        );
        assert_eq!(f.locality_by_id("7").await.unwrap().unwrap().slug, "bani-park");
        assert_eq!(f.event_by_id("9").await.unwrap().unwrap().slug, "e");
        assert!(f.event_by_id("10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_locality() {
        let f = fetchers(
            MemoryStore::new()
                .with_locality(LocalityEntity::new("malviya-nagar", "Malviya Nagar"))
                .with_locality(LocalityEntity::new("mi-road", "M.I. Road")),
        );
        let hit = f.match_locality("malviya-nagar").await.unwrap();
        assert_eq!(hit.slug, "malviya-nagar");
        let hit = f.match_locality("  Malviya Nagar ").await.unwrap();
        assert_eq!(hit.slug, "malviya-nagar");
        // Slugifies to "m-i-road"; only the name lookup finds it.
        let hit = f.match_locality("m.i. road").await.unwrap();
        assert_eq!(hit.slug, "mi-road");
        assert!(f.match_locality("Vaishali Nagar").await.is_none());
        assert!(f.match_locality("   ").await.is_none());

        let down = fetchers(MemoryStore::new().with_outage(Table::Localities));
        assert!(down.match_locality("malviya-nagar").await.is_none());
    }
}
