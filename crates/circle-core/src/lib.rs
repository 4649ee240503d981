//! Circle core.
//!
//! Resolves human-readable city-directory paths (localities, events, deals)
//! to entities, and builds everything a crawler sees for them: titles,
//! descriptions, canonical URLs, crawl directives, schema.org JSON-LD and
//! multi-file sitemaps.
//!
//! # Architecture
//!
//! - [`store`]: read-only port to the content store, plus an in-memory store
//! - [`fetch`]: bounded, per-vertical reads over the port
//! - [`resolve`]: registry, facet and fallback resolution
//! - [`metadata`] and [`structured`]: head metadata and JSON-LD
//! - [`sitemap`] and [`robots`]: crawl-facing documents
//!
//! Stored rows are normalized once, at deserialization ([`normalize::de`]).

pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod resolve;
pub mod robots;
pub mod sitemap;
pub mod store;
pub mod structured;

pub use config::{SiteConfig, SitemapConfig};
pub use error::{Error, Result, StoreError, StoreResult};
pub use fetch::Fetchers;
pub use metadata::{Metadata, MetadataSynthesizer, Robots};
pub use model::{DealEntity, Entity, EventEntity, LocalityEntity, RegistryEntry, Vertical};
pub use resolve::{ResolvedPage, Resolver};
pub use sitemap::{Sitemap, SitemapAggregator};
pub use store::{ContentStore, MemoryStore};
pub use structured::StructuredDataBuilder;
