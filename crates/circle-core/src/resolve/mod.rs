//! Path resolution.
//!
//! A request path is resolved in a fixed order:
//!
//! 1. the page registry (exact path); a row whose page type names a vertical
//!    is fetched by the reference it carries;
//! 2. collection and facet pages;
//! 3. the fallback shape rules, for entities the registry has not caught up
//!    with yet.
//!
//! Whatever resolves is then handed to the metadata synthesizer and the
//! structured-data builder. One resolver serves every vertical; the
//! vertical only selects the fetch and the builders via [`Entity`].

pub mod facet;
pub mod fallback;
pub mod registry;

pub use facet::{FacetPage, FacetRoute, FacetScope, ListedItem, LISTED_ITEMS};
pub use fallback::{FallbackRule, FallbackRules, Inferred};
pub use registry::RegistryResolver;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::error::{Error, Result, StoreError};
use crate::fetch::Fetchers;
use crate::format;
use crate::metadata::{Metadata, MetadataSynthesizer};
use crate::model::{Entity, EventEntity, RegistryEntry, Vertical};
use crate::store::EventQuery;
use crate::structured::{BreadcrumbList, EntityLd, StructuredDataBuilder};

/// Upcoming same-category events linked from an event page.
const RELATED_EVENTS: usize = 3;

/// Map a failed read to a resolution error. Timeouts read as absence.
pub(crate) fn fetch_failure(path: &str, error: StoreError) -> Error {
    if error.is_timeout() {
        tracing::debug!(path = %path, error = %error, "read timed out, treating as not found");
        Error::NotFound(path.to_string())
    } else {
        Error::UpstreamUnavailable(error)
    }
}

/// Normalize a request path: query and fragment dropped, empty segments
/// and the trailing slash removed, segments percent-decoded.
pub fn normalize_path(raw: &str) -> String {
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Percent-encode each segment of a normalized path, the inverse of
/// [`normalize_path`]. Repeated slashes collapse, so the result never
/// starts with `//`.
pub fn encode_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect();
    format!("/{}", segments.join("/"))
}

/// How an entity is referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EntityKey {
    Slug(String),
    Id(String),
}

impl EntityKey {
    /// Registry reference: `entity_key` as a slug, else `entity_id`, else
    /// the last path segment.
    fn from_entry(entry: &RegistryEntry, path: &str) -> Self {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        if let Some(key) = non_blank(&entry.entity_key) {
            return EntityKey::Slug(key);
        }
        if let Some(id) = non_blank(&entry.entity_id) {
            return EntityKey::Id(id);
        }
        EntityKey::Slug(path.rsplit('/').next().unwrap_or_default().to_string())
    }
}

/// Which layer resolved the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Registry,
    Facet,
    Fallback,
}

/// The resolved subject of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageContent {
    Entity(Entity),
    Facet(FacetPage),
}

/// An internal link shown alongside the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub path: String,
}

impl Link {
    fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// A fully resolved page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPage {
    /// Normalized request path.
    pub path: String,
    pub source: Source,
    pub content: PageContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryEntry>,
    pub metadata: Metadata,
    pub breadcrumb: BreadcrumbList,
    pub structured_data: EntityLd,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<Link>,
}

impl ResolvedPage {
    /// Same-origin canonical path, when it names a different page than the
    /// request path.
    ///
    /// Both sides are compared normalized, so a canonical that differs only
    /// by a trailing slash, a query or its encoding is not a redirect.
    pub fn redirect_target(&self, site: &SiteConfig) -> Option<String> {
        let canonical = normalize_path(site.local_path(&self.metadata.canonical)?);
        (canonical != self.path).then(|| encode_path(&canonical))
    }

    /// Display name of the page subject.
    pub fn heading(&self) -> String {
        match &self.content {
            PageContent::Entity(entity) => entity.display_name(),
            PageContent::Facet(_) => self.metadata.title.clone(),
        }
    }
}

/// Resolves request paths to pages.
#[derive(Clone)]
pub struct Resolver {
    fetchers: Fetchers,
    registry: RegistryResolver,
    rules: FallbackRules,
    metadata: MetadataSynthesizer,
    structured: StructuredDataBuilder,
    site: SiteConfig,
}

impl Resolver {
    /// Create a resolver with the default fallback rules for the site.
    ///
    /// Fails when the site's city slug collides with a vertical prefix.
    pub fn new(fetchers: Fetchers, site: SiteConfig) -> Result<Self> {
        let rules = FallbackRules::new(&site.city_slug)?;
        Ok(Self {
            registry: RegistryResolver::new(fetchers.clone()),
            fetchers,
            rules,
            metadata: MetadataSynthesizer::new(site.clone()),
            structured: StructuredDataBuilder::new(site.clone()),
            site,
        })
    }

    /// Replace the fallback rules.
    pub fn with_rules(mut self, rules: FallbackRules) -> Self {
        self.rules = rules;
        self
    }

    /// The configured site.
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Resolve a request path.
    ///
    /// A registry outage is logged and resolution continues with the
    /// facet and fallback rules.
    pub async fn resolve(&self, raw_path: &str) -> Result<ResolvedPage> {
        let path = normalize_path(raw_path);

        let entry = match self.registry.resolve(&path).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "registry unavailable, using fallback rules");
                None
            }
        };

        if let Some(entry) = &entry {
            if let Some(vertical) = entry.vertical() {
                let key = EntityKey::from_entry(entry, &path);
                let entity = self.fetch(vertical, &key, &path).await?;
                tracing::debug!(path = %path, vertical = %vertical, "resolved from registry");
                return Ok(self.entity_page(path, Source::Registry, Some(entry.clone()), entity).await);
            }
            tracing::debug!(
                path = %path,
                page_type = %entry.page_type.as_str(),
                "registry page type not rendered here"
            );
        }

        if let Some(route) = FacetRoute::match_path(&path, &self.site.city_slug) {
            let page = route.load(&self.fetchers, &self.site, &path).await?;
            tracing::debug!(path = %path, "resolved facet page");
            return Ok(self.facet_page(path, entry, page));
        }

        if let Some(inferred) = self.rules.infer_vertical(&path) {
            let entity = self
                .fetch(inferred.vertical, &EntityKey::Slug(inferred.slug), &path)
                .await?;
            tracing::debug!(path = %path, vertical = %inferred.vertical, "resolved by fallback rule");
            return Ok(self.entity_page(path, Source::Fallback, entry, entity).await);
        }

        Err(Error::NotFound(path))
    }

    async fn fetch(&self, vertical: Vertical, key: &EntityKey, path: &str) -> Result<Entity> {
        let f = &self.fetchers;
        let found = match (vertical, key) {
            (Vertical::Locality, EntityKey::Slug(slug)) => {
                f.locality_by_slug(slug).await.map(|e| e.map(Entity::Locality))
            }
            (Vertical::Locality, EntityKey::Id(id)) => {
                f.locality_by_id(id).await.map(|e| e.map(Entity::Locality))
            }
            (Vertical::Event, EntityKey::Slug(slug)) => {
                f.event_by_slug(slug).await.map(|e| e.map(Entity::Event))
            }
            (Vertical::Event, EntityKey::Id(id)) => {
                f.event_by_id(id).await.map(|e| e.map(Entity::Event))
            }
            (Vertical::Deal, EntityKey::Slug(slug)) => {
                f.deal_by_slug(slug).await.map(|e| e.map(Entity::Deal))
            }
            (Vertical::Deal, EntityKey::Id(id)) => {
                f.deal_by_id(id).await.map(|e| e.map(Entity::Deal))
            }
        };
        match found {
            Ok(Some(entity)) => Ok(entity),
            Ok(None) => Err(Error::NotFound(path.to_string())),
            Err(e) => Err(fetch_failure(path, e)),
        }
    }

    async fn entity_page(
        &self,
        path: String,
        source: Source,
        entry: Option<RegistryEntry>,
        entity: Entity,
    ) -> ResolvedPage {
        let related = self.related(&entity).await;
        // Inferred pages canonicalize to the vertical's primary path, so an
        // alias such as /localities/{slug} never competes with /{city}/{slug}.
        let canonical_path = match source {
            Source::Fallback => {
                normalize_path(&entity.vertical().entity_path(&self.site, entity.slug()))
            }
            _ => path.clone(),
        };
        let metadata = self.metadata.build(entry.as_ref(), &entity, &canonical_path);
        let breadcrumb = self.structured.breadcrumb(&path, Some(&entity.display_name()));
        let structured_data = self.structured.entity(&entity, &metadata);
        ResolvedPage {
            path,
            source,
            content: PageContent::Entity(entity),
            registry: entry,
            metadata,
            breadcrumb,
            structured_data,
            related,
        }
    }

    fn facet_page(&self, path: String, entry: Option<RegistryEntry>, page: FacetPage) -> ResolvedPage {
        let metadata = self.metadata.build_facet(entry.as_ref(), &page, &path);
        let breadcrumb = self.structured.breadcrumb(&path, page.locality_name());
        let structured_data = self.structured.collection(&page, &metadata);

        let mut related = Vec::new();
        match page.scope {
            FacetScope::City => {
                for vertical in Vertical::ALL {
                    related.push(Link::new(vertical.label(), vertical.collection_path()));
                }
            }
            FacetScope::Collection(vertical) if page.category.is_none() => {
                let locality = page.locality.as_ref().map(|l| l.slug.as_str());
                for category in vertical.facets().categories {
                    related.push(Link::new(
                        category.label,
                        vertical.facet_path(Some(category.key), locality),
                    ));
                }
            }
            FacetScope::Collection(_) => {}
        }

        ResolvedPage {
            path,
            source: Source::Facet,
            content: PageContent::Facet(page),
            registry: entry,
            metadata,
            breadcrumb,
            structured_data,
            related,
        }
    }

    /// Best-effort links to related pages. Lookups run concurrently and a
    /// failed lookup only drops its links.
    async fn related(&self, entity: &Entity) -> Vec<Link> {
        match entity {
            Entity::Locality(locality) => {
                let name = locality.display_name();
                vec![
                    Link::new(
                        format!("Events in {name}"),
                        Vertical::Event.facet_path(None, Some(&locality.slug)),
                    ),
                    Link::new(
                        format!("Deals in {name}"),
                        Vertical::Deal.facet_path(None, Some(&locality.slug)),
                    ),
                ]
            }
            Entity::Event(event) => self.event_links(event).await,
            Entity::Deal(deal) => {
                let mut links = Vec::new();
                if let Some(text) = deal.locality.as_deref() {
                    if let Some(locality) = self.fetchers.match_locality(text).await {
                        links.push(Link::new(
                            format!("Deals in {}", locality.display_name()),
                            Vertical::Deal.facet_path(None, Some(&locality.slug)),
                        ));
                    }
                }
                let catalog = Vertical::Deal.facets();
                if let Some(category) = deal.category.as_deref().and_then(|c| catalog.category(c)) {
                    links.push(Link::new(
                        format!("{} deals", category.label),
                        Vertical::Deal.facet_path(Some(category.key), None),
                    ));
                }
                links
            }
        }
    }

    async fn event_links(&self, event: &EventEntity) -> Vec<Link> {
        let category = event
            .category
            .as_deref()
            .and_then(|c| Vertical::Event.facets().category(c));

        let locality = async {
            match event.locality.as_deref() {
                Some(text) => self.fetchers.match_locality(text).await,
                None => None,
            }
        };
        let similar = async {
            let Some(category) = category else {
                return Vec::new();
            };
            let query = EventQuery::new(RELATED_EVENTS + 1)
                .with_category(category.key)
                .starting_after(format::now_lastmod());
            self.fetchers.events(&query).await.unwrap_or_else(|e| {
                tracing::debug!(event = %event.slug, error = %e, "related events unavailable");
                Vec::new()
            })
        };
        let (locality, similar) = tokio::join!(locality, similar);

        let mut links = Vec::new();
        if let Some(locality) = locality {
            let name = locality.display_name();
            links.push(Link::new(
                format!("Locality guide: {name}"),
                Vertical::Locality.entity_path(&self.site, &locality.slug),
            ));
            links.push(Link::new(
                format!("More events in {name}"),
                Vertical::Event.facet_path(None, Some(&locality.slug)),
            ));
        }
        if let Some(category) = category {
            links.push(Link::new(
                format!("More {} events", category.label),
                Vertical::Event.facet_path(Some(category.key), None),
            ));
        }
        links.extend(
            similar
                .iter()
                .filter(|e| e.slug != event.slug)
                .take(RELATED_EVENTS)
                .map(|e| Link::new(e.display_title(), Vertical::Event.entity_path(&self.site, &e.slug))),
        );
        links
    }
}
