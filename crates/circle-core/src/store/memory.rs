//! In-memory content store.
//!
//! Backs fixture mode and the test suites. Tables can be made to fail or to
//! respond slowly so that degradation paths can be exercised.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{ContentStore, DealQuery, EventOrder, EventQuery, LocalityFilter, Lookup, Table};
use crate::error::{StoreError, StoreResult};
use crate::model::{
    DealEntity, EventEntity, IndexState, LocalityEntity, LocalitySummary, PageType, RegistryEntry,
};
use crate::format::parse_timestamp;
use crate::normalize::slugify;

/// Rows loaded from a fixture document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub registry: Vec<RegistryEntry>,
    pub localities: Vec<LocalityEntity>,
    pub events: Vec<EventEntity>,
    pub deals: Vec<DealEntity>,
}

/// Content store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    registry: BTreeMap<String, RegistryEntry>,
    localities: Vec<LocalityEntity>,
    events: Vec<EventEntity>,
    deals: Vec<DealEntity>,
    outages: HashSet<Table>,
    latency: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from fixture rows. Later registry rows replace earlier
    /// rows with the same path.
    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        let mut store = Self::new();
        for entry in fixtures.registry {
            store = store.with_registry_entry(entry);
        }
        store.localities = fixtures.localities;
        store.events = fixtures.events;
        store.deals = fixtures.deals;
        store
    }

    /// Parse a JSON fixture document.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        Ok(Self::from_fixtures(serde_json::from_str(json)?))
    }

    /// Load a JSON fixture file.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Add or replace the registry row for its path.
    pub fn with_registry_entry(mut self, entry: RegistryEntry) -> Self {
        self.registry.insert(entry.path.clone(), entry);
        self
    }

    /// Add a locality.
    pub fn with_locality(mut self, locality: LocalityEntity) -> Self {
        self.localities.push(locality);
        self
    }

    /// Add an event.
    pub fn with_event(mut self, event: EventEntity) -> Self {
        self.events.push(event);
        self
    }

    /// Add a deal.
    pub fn with_deal(mut self, deal: DealEntity) -> Self {
        self.deals.push(deal);
        self
    }

    /// Make every read of `table` fail.
    pub fn with_outage(mut self, table: Table) -> Self {
        self.outages.insert(table);
        self
    }

    /// Delay every read by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn gate(&self, table: Table) -> StoreResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.outages.contains(&table) {
            return Err(StoreError::Query(format!("relation \"{table}\" is unavailable")));
        }
        Ok(())
    }
}

fn matches_lookup(lookup: Lookup<'_>, slug: &str, id: Option<&str>, name: Option<&str>) -> bool {
    match lookup {
        Lookup::Slug(s) => slug == s,
        Lookup::Id(i) => id == Some(i),
        Lookup::Name(n) => name.is_some_and(|name| name.trim().eq_ignore_ascii_case(n.trim())),
    }
}

fn matches_category(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => value.is_some_and(|c| c.trim().eq_ignore_ascii_case(wanted)),
        None => true,
    }
}

fn matches_locality(text: Option<&str>, filter: Option<&LocalityFilter>) -> bool {
    match filter {
        Some(filter) => text.is_some_and(|text| {
            text.trim().eq_ignore_ascii_case(&filter.name) || slugify(text) == filter.slug
        }),
        None => true,
    }
}

fn matches_query(event: &EventEntity, query: &EventQuery) -> bool {
    if !matches_category(event.category.as_deref(), query.category.as_deref())
        || !matches_locality(event.locality.as_deref(), query.locality.as_ref())
    {
        return false;
    }
    if let Some(after) = query.starts_after.as_deref().and_then(parse_timestamp) {
        let starts = event.start_date.as_deref().and_then(parse_timestamp);
        if !starts.is_some_and(|s| s >= after) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn registry_entry(&self, path: &str) -> StoreResult<Option<RegistryEntry>> {
        self.gate(Table::Registry).await?;
        Ok(self.registry.get(path).cloned())
    }

    async fn registry_entries(
        &self,
        page_type: &PageType,
        limit: usize,
    ) -> StoreResult<Vec<RegistryEntry>> {
        self.gate(Table::Registry).await?;
        let mut rows: Vec<RegistryEntry> = self
            .registry
            .values()
            .filter(|r| &r.page_type == page_type && r.index_state == IndexState::Index)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn locality(&self, lookup: Lookup<'_>) -> StoreResult<Option<LocalityEntity>> {
        self.gate(Table::Localities).await?;
        Ok(self
            .localities
            .iter()
            .find(|l| matches_lookup(lookup, &l.slug, l.id.as_deref(), l.name.as_deref()))
            .cloned())
    }

    async fn localities(&self, limit: usize) -> StoreResult<Vec<LocalitySummary>> {
        self.gate(Table::Localities).await?;
        let mut rows: Vec<LocalitySummary> =
            self.localities.iter().map(LocalitySummary::from).collect();
        rows.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn event(&self, lookup: Lookup<'_>) -> StoreResult<Option<EventEntity>> {
        self.gate(Table::Events).await?;
        Ok(self
            .events
            .iter()
            .filter(|e| e.status.is_visible())
            .find(|e| matches_lookup(lookup, &e.slug, e.id.as_deref(), e.title.as_deref()))
            .cloned())
    }

    async fn events(&self, query: &EventQuery) -> StoreResult<Vec<EventEntity>> {
        self.gate(Table::Events).await?;
        let mut rows: Vec<EventEntity> = self
            .events
            .iter()
            .filter(|e| e.status.is_visible() && matches_query(e, query))
            .cloned()
            .collect();
        rows.sort_by(|a, b| match query.order {
            EventOrder::StartAscending => a.start_date.cmp(&b.start_date),
            EventOrder::StartDescending => b.start_date.cmp(&a.start_date),
        });
        rows.truncate(query.limit);
        Ok(rows)
    }

    async fn deal(&self, lookup: Lookup<'_>) -> StoreResult<Option<DealEntity>> {
        self.gate(Table::Deals).await?;
        Ok(self
            .deals
            .iter()
            .find(|d| matches_lookup(lookup, &d.slug, d.id.as_deref(), d.title.as_deref()))
            .cloned())
    }

    async fn deals(&self, query: &DealQuery) -> StoreResult<Vec<DealEntity>> {
        self.gate(Table::Deals).await?;
        let mut rows: Vec<DealEntity> = self
            .deals
            .iter()
            .filter(|d| {
                matches_category(d.category.as_deref(), query.category.as_deref())
                    && matches_locality(d.locality.as_deref(), query.locality.as_ref())
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows.truncate(query.limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventStatus;

    fn store() -> MemoryStore {
        let mut draft = EventEntity::new("secret-gig", "Secret Gig");
        draft.status = EventStatus::Draft;
        let mut jazz = EventEntity::new("jazz-night", "Jazz Night");
        jazz.category = Some("music".into());
        jazz.locality = Some("Malviya Nagar".into());
        jazz.start_date = Some("2026-03-01T19:00:00+05:30".into());
        let mut quiz = EventEntity::new("quiz", "Quiz");
        quiz.category = Some("Music".into());
        quiz.locality = Some("c scheme".into());
        quiz.start_date = Some("2026-01-01T19:00:00+05:30".into());

        MemoryStore::new()
            .with_locality(LocalityEntity::new("malviya-nagar", "Malviya Nagar"))
            .with_locality(LocalityEntity::new("bani-park", "Bani Park"))
            .with_event(draft)
            .with_event(jazz)
            .with_event(quiz)
    }

    #[tokio::test]
    async fn test_hidden_events_are_never_returned() {
        let store = store();
        assert!(store.event(Lookup::Slug("secret-gig")).await.unwrap().is_none());
        let all = store.events(&EventQuery::new(10)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_event_filters() {
        let store = store();
        let q = EventQuery::new(10).with_category("MUSIC").with_locality("c-scheme", "C-Scheme");
        let rows = store.events(&q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slug, "quiz");

        let q = EventQuery::new(10).starting_after("2026-02-01T00:00:00Z");
        let rows = store.events(&q).await.unwrap();
        assert_eq!(rows.iter().map(|e| e.slug.as_str()).collect::<Vec<_>>(), vec!["jazz-night"]);

        let q = EventQuery::new(1).with_order(EventOrder::StartDescending);
        assert_eq!(store.events(&q).await.unwrap()[0].slug, "jazz-night");
    }

    #[tokio::test]
    async fn test_deal_filters() {
        let mut older = DealEntity::new("thali-offer", "Thali Offer", "restaurants");
        older.locality = Some("Bani Park".into());
        older.updated_at = Some("2026-01-01T00:00:00Z".into());
        let mut newer = DealEntity::new("latte-deal", "Latte Deal", "cafes");
        newer.locality = Some("bani park".into());
        newer.updated_at = Some("2026-02-01T00:00:00Z".into());
        let store = MemoryStore::new().with_deal(older).with_deal(newer);

        let all = store.deals(&DealQuery::new(10)).await.unwrap();
        assert_eq!(all[0].slug, "latte-deal");
        let q = DealQuery::new(10)
            .with_category("Restaurants")
            .with_locality("bani-park", "Bani Park");
        let rows = store.deals(&q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slug, "thali-offer");
        assert_eq!(store.deals(&DealQuery::new(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_locality_lookups() {
        let store = store();
        assert!(store.locality(Lookup::Name("malviya NAGAR")).await.unwrap().is_some());
        assert!(store.locality(Lookup::Slug("Malviya Nagar")).await.unwrap().is_none());
        let names: Vec<String> = store
            .localities(10)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.slug)
            .collect();
        assert_eq!(names, vec!["bani-park", "malviya-nagar"]);
    }

    #[tokio::test]
    async fn test_outage_is_an_error_not_absence() {
        let store = store().with_outage(Table::Localities);
        let err = store.locality(Lookup::Slug("bani-park")).await.unwrap_err();
        assert!(!err.is_timeout());
        assert!(store.event(Lookup::Slug("jazz-night")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_one_registry_row_per_path() {
        let store = MemoryStore::new()
            .with_registry_entry(RegistryEntry::new("/a", PageType::Deal))
            .with_registry_entry(RegistryEntry::new("/a", PageType::Event));
        let row = store.registry_entry("/a").await.unwrap().unwrap();
        assert_eq!(row.page_type, PageType::Event);
    }

    #[test]
    fn test_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.json");
        std::fs::write(
            &path,
            r#"{"localities": [{"slug": "bani-park", "pin_code": "302016"}], "events": []}"#,
        )
        .unwrap();
        let store = MemoryStore::from_path(&path).unwrap();
        assert_eq!(store.localities[0].pin_codes, vec!["302016"]);

        std::fs::write(&path, "{not json").unwrap();
        assert!(MemoryStore::from_path(&path).is_err());
    }
}
