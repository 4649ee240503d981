//! Content model: verticals, registry rows and entity records.

pub mod deal;
pub mod event;
pub mod facet;
pub mod locality;
pub mod registry;

pub use deal::DealEntity;
pub use event::{EventEntity, EventStatus, VISIBLE_EVENT_STATUSES};
pub use facet::{Category, FacetCatalog, DEAL_CATEGORIES, EVENT_CATEGORIES};
pub use locality::{LocalityEntity, LocalitySummary};
pub use registry::{IndexState, PageType, RegistryEntry};

use serde::Serialize;

use crate::config::SiteConfig;

/// A content type with its own entity shape and slug space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    /// Neighbourhood guides.
    Locality,
    /// Dated happenings.
    Event,
    /// Merchant offers.
    Deal,
}

impl Vertical {
    /// Every vertical, in sitemap index order.
    pub const ALL: [Vertical; 3] = [Vertical::Event, Vertical::Locality, Vertical::Deal];

    /// Singular name, matching the registry `page_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Vertical::Locality => "locality",
            Vertical::Event => "event",
            Vertical::Deal => "deal",
        }
    }

    /// Backing table name, also the collection path segment.
    pub fn table(&self) -> &'static str {
        match self {
            Vertical::Locality => "localities",
            Vertical::Event => "events",
            Vertical::Deal => "deals",
        }
    }

    /// Vertical owning a table name.
    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.table().eq_ignore_ascii_case(table.trim()))
    }

    /// Human label for breadcrumbs and collection titles.
    pub fn label(&self) -> &'static str {
        match self {
            Vertical::Locality => "Localities",
            Vertical::Event => "Events",
            Vertical::Deal => "Deals",
        }
    }

    /// Sitemap document name (`sitemap-events.xml`).
    pub fn sitemap_file(&self) -> String {
        format!("sitemap-{}.xml", self.table())
    }

    /// Vertical owning a sitemap document name.
    pub fn from_sitemap_file(file: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.sitemap_file() == file)
    }

    /// Collection path (`/events`).
    pub fn collection_path(&self) -> String {
        format!("/{}", self.table())
    }

    /// Primary path of an entity page.
    ///
    /// Localities live under the city hub (`/jaipur/{slug}`); the other
    /// verticals under their collection.
    pub fn entity_path(&self, site: &SiteConfig, slug: &str) -> String {
        match self {
            Vertical::Locality => format!("/{}/{}", site.city_slug, urlencoding::encode(slug)),
            _ => format!("/{}/{}", self.table(), urlencoding::encode(slug)),
        }
    }

    /// Path of a collection or facet page.
    pub fn facet_path(&self, category: Option<&str>, locality: Option<&str>) -> String {
        let mut path = self.collection_path();
        if let Some(category) = category {
            path.push_str("/category/");
            path.push_str(&urlencoding::encode(category));
        }
        if let Some(locality) = locality {
            path.push_str("/locality/");
            path.push_str(&urlencoding::encode(locality));
        }
        path
    }

    /// Static facet catalog of this vertical.
    pub fn facets(&self) -> FacetCatalog {
        FacetCatalog::for_vertical(*self)
    }
}

/// A resolved record of any vertical.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "vertical", content = "record", rename_all = "lowercase")]
pub enum Entity {
    Locality(LocalityEntity),
    Event(EventEntity),
    Deal(DealEntity),
}

impl Entity {
    /// Vertical of the record.
    pub fn vertical(&self) -> Vertical {
        match self {
            Entity::Locality(_) => Vertical::Locality,
            Entity::Event(_) => Vertical::Event,
            Entity::Deal(_) => Vertical::Deal,
        }
    }

    /// Slug of the record.
    pub fn slug(&self) -> &str {
        match self {
            Entity::Locality(l) => &l.slug,
            Entity::Event(e) => &e.slug,
            Entity::Deal(d) => &d.slug,
        }
    }

    /// Name shown in headings and breadcrumbs.
    pub fn display_name(&self) -> String {
        match self {
            Entity::Locality(l) => l.display_name().to_string(),
            Entity::Event(e) => e.display_title().to_string(),
            Entity::Deal(d) => d.display_title(),
        }
    }
}

impl std::fmt::Display for Vertical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let site = SiteConfig::default();
        assert_eq!(Vertical::Locality.entity_path(&site, "malviya-nagar"), "/jaipur/malviya-nagar");
        assert_eq!(Vertical::Event.entity_path(&site, "holi fest"), "/events/holi%20fest");
        assert_eq!(Vertical::Deal.facet_path(None, None), "/deals");
        assert_eq!(
            Vertical::Deal.facet_path(Some("event-tickets"), Some("c-scheme")),
            "/deals/category/event-tickets/locality/c-scheme"
        );
        assert_eq!(Vertical::Event.facet_path(None, Some("bani-park")), "/events/locality/bani-park");
    }

    #[test]
    fn test_table_and_sitemap_names() {
        assert_eq!(Vertical::from_table("Events"), Some(Vertical::Event));
        assert_eq!(Vertical::from_table("merchants"), None);
        assert_eq!(
            Vertical::from_sitemap_file("sitemap-localities.xml"),
            Some(Vertical::Locality)
        );
        assert_eq!(Vertical::from_sitemap_file("sitemap-news.xml"), None);
    }
}
