//! Circle HTTP gateway.
//!
//! Serves resolved directory pages as HTML documents (head metadata and
//! JSON-LD), the same pages as JSON, the sitemap documents and `robots.txt`.

pub mod config;
pub mod error;
pub mod render;
pub mod routes;

pub use config::{Args, GatewayConfig, StoreSource};
pub use error::AppError;

use std::sync::Arc;

use axum::Router;
use circle_core::{ContentStore, Fetchers, MemoryStore, Resolver, SitemapAggregator};
use circle_postgres::{PgConfig, PgStore};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Path resolver.
    pub resolver: Resolver,
    /// Sitemap builder.
    pub sitemaps: SitemapAggregator,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create application state over a content store.
    ///
    /// Fails when the configured city slug collides with a vertical prefix.
    pub fn new(store: Arc<dyn ContentStore>, config: GatewayConfig) -> circle_core::Result<Self> {
        let fetchers = Fetchers::new(store).with_read_timeout(config.read_timeout);
        let resolver = Resolver::new(fetchers.clone(), config.site.clone())?;
        let sitemaps = SitemapAggregator::new(fetchers, config.site.clone(), config.sitemap);
        Ok(Self {
            resolver,
            sitemaps,
            config,
        })
    }
}

/// Open the configured content store.
pub async fn open_store(config: &GatewayConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    let store: Arc<dyn ContentStore> = match &config.store {
        StoreSource::Postgres(url) => {
            let pg = PgConfig::new(url.as_str())
                .with_max_connections(config.pool_max_connections)
                .with_acquire_timeout(config.read_timeout);
            Arc::new(PgStore::connect(&pg).await?)
        }
        StoreSource::Fixtures(path) => {
            let store = MemoryStore::from_path(path)?;
            tracing::info!(path = %path.display(), "loaded fixture content");
            Arc::new(store)
        }
        StoreSource::Empty => {
            tracing::warn!("no content store configured, serving an empty directory");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::robots::routes())
        .merge(routes::sitemap::routes())
        .merge(routes::content::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
