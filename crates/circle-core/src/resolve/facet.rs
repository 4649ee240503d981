//! Collection and facet pages.
//!
//! Every URL the sitemaps emit that is not an entity page lands here: the
//! city hub, each vertical's collection, and the category, locality and
//! category × locality facets of the locality-scoped verticals.

use serde::Serialize;

use super::fetch_failure;
use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetchers;
use crate::format;
use crate::model::{Category, LocalitySummary, Vertical};
use crate::store::{DealQuery, EventQuery};

/// Items listed on a facet page and in its `ItemList`.
pub const LISTED_ITEMS: usize = 10;

const CATEGORY_TOKEN: &str = "category";
const LOCALITY_TOKEN: &str = "locality";

/// What a facet page browses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "vertical", rename_all = "lowercase")]
pub enum FacetScope {
    /// The city hub, listing localities.
    City,
    /// A vertical's collection.
    Collection(Vertical),
}

/// A matched facet path, before any data is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRoute {
    pub scope: FacetScope,
    pub category: Option<&'static Category>,
    /// Locality slug, validated on load.
    pub locality: Option<String>,
}

impl FacetRoute {
    /// Match a normalized path against the facet shapes.
    ///
    /// Unknown categories and facets a vertical does not support do not
    /// match.
    pub fn match_path(path: &str, city_slug: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (first, rest) = segments.split_first()?;

        if rest.is_empty() && first.eq_ignore_ascii_case(city_slug) {
            return Some(Self {
                scope: FacetScope::City,
                category: None,
                locality: None,
            });
        }

        let vertical = Vertical::from_table(first)?;
        let catalog = vertical.facets();
        let mut route = Self {
            scope: FacetScope::Collection(vertical),
            category: None,
            locality: None,
        };
        match rest {
            [] => {}
            [CATEGORY_TOKEN, category] => {
                route.category = Some(catalog.category(category)?);
            }
            [LOCALITY_TOKEN, slug] if catalog.locality_scoped => {
                route.locality = Some(slug.to_string());
            }
            [CATEGORY_TOKEN, category, LOCALITY_TOKEN, slug] if catalog.locality_scoped => {
                route.category = Some(catalog.category(category)?);
                route.locality = Some(slug.to_string());
            }
            _ => return None,
        }
        Some(route)
    }

    /// Validate the locality and list the page's items.
    pub async fn load(&self, fetchers: &Fetchers, site: &SiteConfig, path: &str) -> Result<FacetPage> {
        let locality = match &self.locality {
            Some(slug) => match fetchers.locality_by_slug(slug).await {
                Ok(Some(found)) => Some(LocalitySummary::from(&found)),
                Ok(None) => return Err(Error::NotFound(path.to_string())),
                Err(e) => return Err(fetch_failure(path, e)),
            },
            None => None,
        };

        let mut page = FacetPage {
            scope: self.scope,
            category: self.category.copied(),
            locality,
            items: Vec::new(),
        };
        page.items = page.list_items(fetchers, site).await;
        Ok(page)
    }
}

/// A listed entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedItem {
    pub name: String,
    pub path: String,
}

/// A resolved collection or facet page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetPage {
    pub scope: FacetScope,
    pub category: Option<Category>,
    pub locality: Option<LocalitySummary>,
    pub items: Vec<ListedItem>,
}

impl FacetPage {
    /// Vertical browsed, `Locality` for the city hub.
    pub fn vertical(&self) -> Vertical {
        match self.scope {
            FacetScope::City => Vertical::Locality,
            FacetScope::Collection(vertical) => vertical,
        }
    }

    /// Display name of the scoped locality.
    pub fn locality_name(&self) -> Option<&str> {
        self.locality.as_ref().map(LocalitySummary::display_name)
    }

    /// Listings are best effort: a failed read leaves the page empty.
    async fn list_items(&self, fetchers: &Fetchers, site: &SiteConfig) -> Vec<ListedItem> {
        let listed = match self.vertical() {
            Vertical::Locality => fetchers.localities(LISTED_ITEMS).await.map(|rows| {
                rows.iter()
                    .map(|l| ListedItem {
                        name: l.display_name().to_string(),
                        path: Vertical::Locality.entity_path(site, &l.slug),
                    })
                    .collect()
            }),
            Vertical::Event => {
                let mut query = EventQuery::new(LISTED_ITEMS).starting_after(format::now_lastmod());
                if let Some(category) = self.category {
                    query = query.with_category(category.key);
                }
                if let Some(locality) = &self.locality {
                    query = query.with_locality(&locality.slug, locality.display_name());
                }
                fetchers.events(&query).await.map(|rows| {
                    rows.iter()
                        .map(|e| ListedItem {
                            name: e.display_title().to_string(),
                            path: Vertical::Event.entity_path(site, &e.slug),
                        })
                        .collect()
                })
            }
            Vertical::Deal => {
                let mut query = DealQuery::new(LISTED_ITEMS);
                if let Some(category) = self.category {
                    query = query.with_category(category.key);
                }
                if let Some(locality) = &self.locality {
                    query = query.with_locality(&locality.slug, locality.display_name());
                }
                fetchers.deals(&query).await.map(|rows| {
                    rows.iter()
                        .map(|d| ListedItem {
                            name: d.display_title(),
                            path: Vertical::Deal.entity_path(site, &d.slug),
                        })
                        .collect()
                })
            }
        };
        listed.unwrap_or_else(|e| {
            tracing::warn!(vertical = %self.vertical(), error = %e, "facet listing unavailable");
            Vec::new()
        })
    }
}
