//! Page metadata synthesis.
//!
//! Builds the title, description, canonical URL and crawl directive of a
//! resolved page. Synthesis never fails: an absent field is skipped, never
//! rendered as an empty placeholder.

use serde::{Serialize, Serializer};

use crate::config::SiteConfig;
use crate::format::{self, collapse_whitespace, truncate};
use crate::model::{
    DealEntity, Entity, EventEntity, IndexState, LocalityEntity, RegistryEntry, Vertical,
};
use crate::resolve::facet::{FacetPage, FacetScope};
use crate::resolve::encode_path;

/// Hard cap on descriptions, ellipsis included.
pub const DESCRIPTION_MAX: usize = 160;

/// Stored short descriptions shorter than this are replaced by synthesis.
pub const SHORT_DESCRIPTION_MIN: usize = 60;

/// Crawl directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Robots {
    pub index: bool,
    pub follow: bool,
}

impl Robots {
    pub const INDEX: Robots = Robots {
        index: true,
        follow: true,
    };

    pub const NOINDEX: Robots = Robots {
        index: false,
        follow: false,
    };

    /// Directive for a page with an optional registry row.
    ///
    /// Only an explicit `noindex` opts out; a missing row stays crawlable.
    pub fn for_entry(entry: Option<&RegistryEntry>) -> Self {
        match entry.map(|e| &e.index_state) {
            Some(IndexState::NoIndex) => Self::NOINDEX,
            _ => Self::INDEX,
        }
    }

    /// Whether the page may be indexed and followed.
    pub fn is_indexable(&self) -> bool {
        self.index && self.follow
    }

    /// Value for a `robots` meta tag or an `X-Robots-Tag` header.
    pub fn meta_content(&self) -> String {
        format!(
            "{}, {}",
            if self.index { "index" } else { "noindex" },
            if self.follow { "follow" } else { "nofollow" }
        )
    }
}

impl std::fmt::Display for Robots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_indexable() {
            f.write_str("index, follow")
        } else {
            write!(f, "index: {}, follow: {}", self.index, self.follow)
        }
    }
}

impl Serialize for Robots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Open Graph and Twitter card fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    pub url: String,
    pub site_name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OpenGraph {
    /// Twitter card type.
    pub fn twitter_card(&self) -> &'static str {
        if self.image.is_some() {
            "summary_large_image"
        } else {
            "summary"
        }
    }
}

/// Head metadata of a resolved page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub robots: Robots,
    pub open_graph: OpenGraph,
}

/// Builds [`Metadata`] for entity and facet pages.
#[derive(Debug, Clone)]
pub struct MetadataSynthesizer {
    site: SiteConfig,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Explicit description, else a long-enough short description, else the
/// synthesized sentences.
fn describe<F>(explicit: Option<&str>, short: Option<&str>, synthesize: F) -> String
where
    F: FnOnce() -> Vec<String>,
{
    if let Some(explicit) = non_blank(explicit) {
        return truncate(&collapse_whitespace(explicit), DESCRIPTION_MAX);
    }
    if let Some(short) = non_blank(short).map(collapse_whitespace) {
        if short.chars().count() >= SHORT_DESCRIPTION_MIN {
            return truncate(&short, DESCRIPTION_MAX);
        }
    }
    truncate(&collapse_whitespace(&synthesize().join(" ")), DESCRIPTION_MAX)
}

impl MetadataSynthesizer {
    /// Create a synthesizer for a site.
    pub fn new(site: SiteConfig) -> Self {
        Self { site }
    }

    /// The site this synthesizer builds for.
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Registry canonical when present and non-blank, else origin + path.
    ///
    /// `path` is a normalized (decoded) path; its segments are encoded the
    /// same way sitemap locations are.
    pub fn canonical(&self, entry: Option<&RegistryEntry>, path: &str) -> String {
        entry
            .and_then(RegistryEntry::canonical)
            .map(str::to_string)
            .unwrap_or_else(|| self.site.url(&encode_path(path)))
    }

    /// Metadata of an entity page.
    pub fn build(&self, entry: Option<&RegistryEntry>, entity: &Entity, path: &str) -> Metadata {
        let registry_title = entry.and_then(|e| non_blank(e.title.as_deref()));
        let (title, description, image) = match entity {
            Entity::Locality(locality) => (
                self.locality_title(locality, registry_title),
                self.locality_description(locality),
                None,
            ),
            Entity::Event(event) => (
                self.event_title(event, registry_title),
                self.event_description(event),
                non_blank(event.cover_image.as_deref()).map(str::to_string),
            ),
            Entity::Deal(deal) => (
                self.deal_title(deal, registry_title),
                self.deal_description(deal),
                None,
            ),
        };
        self.assemble(entry, path, title, description, image)
    }

    /// Metadata of a collection or facet page.
    pub fn build_facet(&self, entry: Option<&RegistryEntry>, page: &FacetPage, path: &str) -> Metadata {
        let (title, description) = self.facet_copy(page);
        let title = entry
            .and_then(|e| non_blank(e.title.as_deref()))
            .map(str::to_string)
            .unwrap_or(title);
        self.assemble(
            entry,
            path,
            title,
            truncate(&collapse_whitespace(&description), DESCRIPTION_MAX),
            None,
        )
    }

    fn assemble(
        &self,
        entry: Option<&RegistryEntry>,
        path: &str,
        title: String,
        description: String,
        image: Option<String>,
    ) -> Metadata {
        let canonical = self.canonical(entry, path);
        let open_graph = OpenGraph {
            title: title.clone(),
            description: description.clone(),
            url: canonical.clone(),
            site_name: self.site.site_name.clone(),
            kind: "website",
            image,
        };
        Metadata {
            title,
            description,
            canonical,
            robots: Robots::for_entry(entry),
            open_graph,
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    fn event_city<'a>(&'a self, event: &'a EventEntity) -> &'a str {
        non_blank(event.city.as_deref()).unwrap_or(&self.site.city)
    }

    fn event_title(&self, event: &EventEntity, registry_title: Option<&str>) -> String {
        if let Some(title) = non_blank(event.meta_title.as_deref()).or(registry_title) {
            return title.to_string();
        }
        let city = self.event_city(event);
        match event.start_date.as_deref().and_then(format::date_label) {
            Some(date) => format!(
                "{} — {city} — {date} | Tickets, Venue & Local Guide",
                event.display_title()
            ),
            None => format!("{} — {city} | Tickets, Venue & Local Guide", event.display_title()),
        }
    }

    fn event_description(&self, event: &EventEntity) -> String {
        describe(
            event.meta_description.as_deref(),
            event.short_description.as_deref(),
            || {
                let city = self.event_city(event);
                let locality = non_blank(event.locality.as_deref());
                let mut parts = vec![format!("{} in {city}.", event.display_title())];
                if let Some(date) = event.start_date.as_deref().and_then(format::date_label) {
                    parts.push(format!("Date: {date}."));
                }
                if let Some(category) = non_blank(event.category.as_deref()) {
                    parts.push(format!(
                        "Category: {}.",
                        Vertical::Event.facets().label_for(category)
                    ));
                }
                if event.venue_is_tbd() {
                    parts.push("Venue is yet to be announced — we’ll update once verified.".into());
                } else if let Some(venue) = non_blank(event.venue_name.as_deref()) {
                    match locality {
                        Some(locality) => parts.push(format!("Venue: {venue}, {locality}.")),
                        None => parts.push(format!("Venue: {venue}.")),
                    }
                } else if let Some(locality) = locality {
                    parts.push(format!("Location: {locality}, {city}."));
                }
                if event.is_free {
                    parts.push("Entry is free.".into());
                } else if let Some(price) = event.ticket_price.filter(|p| *p > 0.0) {
                    parts.push(format!("Tickets from {}.", format::price(price)));
                }
                parts.push(format!(
                    "See attendee tips, directions context, and more {city} events on {}.",
                    self.site.site_name
                ));
                parts
            },
        )
    }

    // ------------------------------------------------------------------
    // Localities
    // ------------------------------------------------------------------

    fn locality_title(&self, locality: &LocalityEntity, registry_title: Option<&str>) -> String {
        if let Some(title) = non_blank(locality.meta_title.as_deref()).or(registry_title) {
            return title.to_string();
        }
        format!(
            "{}, {} — Locality Guide | {}",
            locality.display_name(),
            self.site.city,
            self.site.site_name
        )
    }

    fn locality_description(&self, locality: &LocalityEntity) -> String {
        describe(
            locality.meta_description.as_deref(),
            locality.short_description.as_deref(),
            || {
                let name = locality.display_name();
                let mut parts = vec![format!("{name}, {}: locality guide.", self.site.city)];
                if let Some(zone) = non_blank(locality.zone.as_deref()) {
                    parts.push(format!("Zone: {zone}."));
                }
                if let Some(ward) = non_blank(locality.ward.as_deref()) {
                    parts.push(format!("Ward: {ward}."));
                }
                if !locality.pin_codes.is_empty() {
                    parts.push(format!("PIN: {}.", locality.pin_codes.join(", ")));
                }
                if let Some(station) = non_blank(locality.police_station.as_deref()) {
                    parts.push(format!("Police station: {station}."));
                }
                if !locality.landmarks.is_empty() {
                    let landmarks: Vec<&str> =
                        locality.landmarks.iter().take(3).map(String::as_str).collect();
                    parts.push(format!("Landmarks: {}.", landmarks.join(", ")));
                }
                parts.push(format!("Civic info, nearby areas and events around {name}."));
                parts
            },
        )
    }

    // ------------------------------------------------------------------
    // Deals
    // ------------------------------------------------------------------

    fn deal_category(&self, deal: &DealEntity) -> Option<String> {
        non_blank(deal.category.as_deref()).map(|c| Vertical::Deal.facets().label_for(c))
    }

    fn deal_title(&self, deal: &DealEntity, registry_title: Option<&str>) -> String {
        if let Some(title) = non_blank(deal.meta_title.as_deref()).or(registry_title) {
            return title.to_string();
        }
        let city = &self.site.city;
        match self.deal_category(deal) {
            Some(category) => format!(
                "{} — {category} Deal in {city} | {}",
                deal.display_title(),
                self.site.site_name
            ),
            None => format!("{} — Deal in {city} | {}", deal.display_title(), self.site.site_name),
        }
    }

    fn deal_description(&self, deal: &DealEntity) -> String {
        describe(deal.meta_description.as_deref(), deal.description.as_deref(), || {
            let city = &self.site.city;
            let mut parts = vec![format!("{}.", deal.display_title())];
            if let Some(category) = self.deal_category(deal) {
                parts.push(format!("Category: {category}."));
            }
            match non_blank(deal.locality.as_deref()) {
                Some(locality) => parts.push(format!("Available in {locality}, {city}.")),
                None => parts.push(format!("Available across {city}.")),
            }
            parts.push(format!(
                "Browse more {city} deals and offers on {}.",
                self.site.site_name
            ));
            parts
        })
    }

    // ------------------------------------------------------------------
    // Facets
    // ------------------------------------------------------------------

    fn facet_copy(&self, page: &FacetPage) -> (String, String) {
        let city = &self.site.city;
        let site = &self.site.site_name;
        let category = page.category.map(|c| c.label);
        let locality = page.locality_name();

        match (page.scope, category, locality) {
            (FacetScope::City, _, _) => (
                format!("{city} City Guide — Localities, Events & Deals | {site}"),
                format!(
                    "Explore {city} by locality: neighbourhood guides, upcoming events and local deals on {site}."
                ),
            ),
            (FacetScope::Collection(Vertical::Locality), _, _) => (
                format!("{city} Localities | {site}"),
                format!(
                    "Browse {city} neighbourhood pages. Each locality includes practical context and events happening nearby."
                ),
            ),
            (FacetScope::Collection(Vertical::Event), None, None) => (
                format!("{city} Events — Upcoming Events, Festivals, Concerts & More | {site}"),
                format!(
                    "Discover upcoming events in {city}: music, festivals, comedy, workshops and more, with dates, venues and ticket cues."
                ),
            ),
            (FacetScope::Collection(Vertical::Event), Some(label), None) => (
                format!("{city} {label} Events — Upcoming {label} | {site}"),
                format!(
                    "Browse upcoming {} events in {city}: dates, venues, ticket cues and practical attendee notes.",
                    label.to_lowercase()
                ),
            ),
            (FacetScope::Collection(Vertical::Event), None, Some(name)) => (
                format!("Events in {name} | {site}"),
                format!(
                    "Browse upcoming events in {name}, {city}: date and time, venue cues, ticket info and local context."
                ),
            ),
            (FacetScope::Collection(Vertical::Event), Some(label), Some(name)) => (
                format!("{label} Events in {name} | {site}"),
                format!(
                    "Browse {} events in {name}, {city}. Dates, venues and ticket cues, filtered to the locality.",
                    label.to_lowercase()
                ),
            ),
            (FacetScope::Collection(Vertical::Deal), None, None) => (
                format!("{city} Deals & Offers | {site}"),
                format!(
                    "Browse the latest deals and offers across {city}, sorted by category and locality. Curated, practical, and updated regularly."
                ),
            ),
            (FacetScope::Collection(Vertical::Deal), Some(label), None) => (
                format!("{label} Deals & Offers in {city} | {site}"),
                format!(
                    "Discover {} deals and offers in {city}. Filter by locality for practical nearby savings.",
                    label.to_lowercase()
                ),
            ),
            (FacetScope::Collection(Vertical::Deal), None, Some(name)) => (
                format!("Deals in {name} | {site}"),
                format!(
                    "Curated deals and offers in {name}, {city}. Browse by category for locality-specific savings."
                ),
            ),
            (FacetScope::Collection(Vertical::Deal), Some(label), Some(name)) => (
                format!("{label} deals in {name} | {site}"),
                format!(
                    "Browse {} deals in {name} ({city}). Locality-filtered offers for practical nearby savings.",
                    label.to_lowercase()
                ),
            ),
        }
    }
}
