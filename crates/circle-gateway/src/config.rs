//! Gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use circle_core::config::{
    DEFAULT_CITY, DEFAULT_ENTITY_CAP, DEFAULT_LOCALITY_CAP, DEFAULT_ORIGIN, DEFAULT_READ_TIMEOUT,
    DEFAULT_SITE_NAME,
};
use circle_core::{SiteConfig, SitemapConfig};
use circle_postgres::DEFAULT_MAX_CONNECTIONS;
use clap::{ArgGroup, Parser};

/// Log filter used when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "circle_gateway=info,circle_core=info,tower_http=info";

/// Circle gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "circle-gateway")]
#[command(about = "Serves city directory pages, sitemaps and robots.txt")]
#[command(group(ArgGroup::new("store").required(true).args(["database_url", "fixtures"])))]
pub struct Args {
    /// Address to listen on for HTTP requests.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// PostgreSQL connection URL of the content store.
    #[arg(long)]
    pub database_url: Option<String>,

    /// JSON fixture file loaded into an in-memory store instead of PostgreSQL.
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Public origin used for canonical and sitemap URLs.
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// City display name.
    #[arg(long, default_value = DEFAULT_CITY)]
    pub city: String,

    /// City path token. Derived from the city name when unset.
    #[arg(long)]
    pub city_slug: Option<String>,

    /// Site name used in titles and Open Graph tags.
    #[arg(long, default_value = DEFAULT_SITE_NAME)]
    pub site_name: String,

    /// Bound (ms) on every content store read.
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT.as_millis() as u64)]
    pub read_timeout_ms: u64,

    /// Maximum pooled database connections.
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub pool_max_connections: u32,

    /// Maximum localities crossed with facet categories in sitemaps.
    #[arg(long, default_value_t = DEFAULT_LOCALITY_CAP)]
    pub locality_cap: usize,

    /// Maximum entities listed per sitemap.
    #[arg(long, default_value_t = DEFAULT_ENTITY_CAP)]
    pub entity_cap: usize,

    /// Log filter directive, overriding `RUST_LOG`.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Where content is read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreSource {
    /// PostgreSQL at a connection URL.
    Postgres(String),
    /// JSON fixture file.
    Fixtures(PathBuf),
    /// Empty in-memory store.
    #[default]
    Empty,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Content store.
    pub store: StoreSource,
    /// Public site identity.
    pub site: SiteConfig,
    /// Sitemap bounds.
    pub sitemap: SitemapConfig,
    /// Bound on every content store read.
    pub read_timeout: Duration,
    /// Maximum pooled database connections.
    pub pool_max_connections: u32,
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        let store = match (&args.database_url, &args.fixtures) {
            (Some(url), _) => StoreSource::Postgres(url.clone()),
            (None, Some(path)) => StoreSource::Fixtures(path.clone()),
            (None, None) => StoreSource::Empty,
        };

        let mut site = SiteConfig::new(&args.origin)
            .with_city(&args.city)
            .with_site_name(&args.site_name);
        if let Some(slug) = &args.city_slug {
            site = site.with_city_slug(slug);
        }

        Self {
            listen_addr: args.listen.clone(),
            store,
            site,
            sitemap: SitemapConfig::default()
                .with_locality_cap(args.locality_cap)
                .with_entity_cap(args.entity_cap),
            read_timeout: Duration::from_millis(args.read_timeout_ms),
            pool_max_connections: args.pool_max_connections,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            store: StoreSource::default(),
            site: SiteConfig::default(),
            sitemap: SitemapConfig::default(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            pool_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}
