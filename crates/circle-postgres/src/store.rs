//! Pooled store implementation.

use std::time::Duration;

use async_trait::async_trait;
use circle_core::model::{
    DealEntity, EventEntity, LocalityEntity, LocalitySummary, PageType, RegistryEntry,
};
use circle_core::store::{ContentStore, DealQuery, EventQuery, Lookup, Table};
use circle_core::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::query;

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default bound on waiting for a pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings.
#[derive(Debug, Clone)]
pub struct PgConfig {
    /// Connection URL (`postgres://...`).
    pub url: String,
    /// Pool size.
    pub max_connections: u32,
    /// Bound on waiting for a connection.
    pub acquire_timeout: Duration,
}

impl PgConfig {
    /// Settings for a URL with default pool limits.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Set the pool size.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    /// Set the acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Content store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    acquire_timeout: Duration,
}

impl PgStore {
    /// Connect a pool.
    pub async fn connect(config: &PgConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;
        tracing::info!(
            max_connections = config.max_connections,
            "connected to content database"
        );
        Ok(Self::from_pool(pool).with_acquire_timeout(config.acquire_timeout))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: Table,
        mut qb: QueryBuilder<'static, Postgres>,
    ) -> StoreResult<Vec<T>> {
        let rows: Vec<Json<Value>> = qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.store_error(table, e))?;
        Ok(decode_rows(table, rows.into_iter().map(|Json(row)| row)))
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: Table,
        qb: QueryBuilder<'static, Postgres>,
    ) -> StoreResult<Option<T>> {
        Ok(self.fetch_rows(table, qb).await?.into_iter().next())
    }

    fn store_error(&self, table: Table, err: sqlx::Error) -> StoreError {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout(self.acquire_timeout),
            other => StoreError::Query(format!("{table}: {other}")),
        }
    }
}

/// Decode `jsonb` rows, dropping any that do not fit the model.
fn decode_rows<T: DeserializeOwned>(table: Table, rows: impl Iterator<Item = Value>) -> Vec<T> {
    rows.filter_map(|row| match serde_json::from_value(row) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(%table, error = %e, "dropping malformed row");
            None
        }
    })
    .collect()
}

#[async_trait]
impl ContentStore for PgStore {
    async fn registry_entry(&self, path: &str) -> StoreResult<Option<RegistryEntry>> {
        self.fetch_one(Table::Registry, query::registry_entry(path))
            .await
    }

    async fn registry_entries(
        &self,
        page_type: &PageType,
        limit: usize,
    ) -> StoreResult<Vec<RegistryEntry>> {
        self.fetch_rows(Table::Registry, query::registry_entries(page_type.as_str(), limit))
            .await
    }

    async fn locality(&self, lookup: Lookup<'_>) -> StoreResult<Option<LocalityEntity>> {
        self.fetch_one(Table::Localities, query::locality(lookup))
            .await
    }

    async fn localities(&self, limit: usize) -> StoreResult<Vec<LocalitySummary>> {
        self.fetch_rows(Table::Localities, query::localities(limit))
            .await
    }

    async fn event(&self, lookup: Lookup<'_>) -> StoreResult<Option<EventEntity>> {
        // Status is re-checked so a row with an unexpected spelling never leaks.
        let event: Option<EventEntity> = self.fetch_one(Table::Events, query::event(lookup)).await?;
        Ok(event.filter(|e| e.status.is_visible()))
    }

    async fn events(&self, query: &EventQuery) -> StoreResult<Vec<EventEntity>> {
        let events: Vec<EventEntity> = self.fetch_rows(Table::Events, query::events(query)).await?;
        Ok(events.into_iter().filter(|e| e.status.is_visible()).collect())
    }

    async fn deal(&self, lookup: Lookup<'_>) -> StoreResult<Option<DealEntity>> {
        self.fetch_one(Table::Deals, query::deal(lookup)).await
    }

    async fn deals(&self, query: &DealQuery) -> StoreResult<Vec<DealEntity>> {
        self.fetch_rows(Table::Deals, query::deals(query)).await
    }
}
