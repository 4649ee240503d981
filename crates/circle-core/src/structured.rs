//! schema.org JSON-LD.
//!
//! Every object here is a typed struct; absent fields are skipped on
//! serialization, never emitted as `null`.

use serde::Serialize;

use crate::config::SiteConfig;
use crate::metadata::Metadata;
use crate::model::{DealEntity, Entity, EventEntity, LocalityEntity, Vertical};
use crate::normalize::titleize;
use crate::resolve::facet::{FacetPage, LISTED_ITEMS};

/// JSON-LD `@context`.
pub const SCHEMA_CONTEXT: &str = "https://schema.org";

const IN_STOCK: &str = "https://schema.org/InStock";
const EVENT_SCHEDULED: &str = "https://schema.org/EventScheduled";
const OFFLINE_ATTENDANCE: &str = "https://schema.org/OfflineEventAttendanceMode";
const ONLINE_ATTENDANCE: &str = "https://schema.org/OnlineEventAttendanceMode";

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One breadcrumb step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreadcrumbItem {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub position: usize,
    pub name: String,
    pub item: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbList {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub item_list_element: Vec<BreadcrumbItem>,
}

/// Breadcrumb list with positions `1..=crumbs.len()`.
pub fn build_breadcrumb(crumbs: &[Crumb]) -> BreadcrumbList {
    BreadcrumbList {
        context: SCHEMA_CONTEXT,
        kind: "BreadcrumbList",
        item_list_element: crumbs
            .iter()
            .enumerate()
            .map(|(i, crumb)| BreadcrumbItem {
                kind: "ListItem",
                position: i + 1,
                name: crumb.name.clone(),
                item: crumb.url.clone(),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub address_region: String,
    pub address_country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoCoordinates {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinates {
    fn from_pair(coordinates: Option<(f64, f64)>) -> Option<Self> {
        coordinates.map(|(latitude, longitude)| Self {
            kind: "GeoCoordinates",
            latitude,
            longitude,
        })
    }
}

/// `Place`, top-level for localities or nested as a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<&'static str>,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoCoordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contained_in_place: Option<Box<Place>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

impl Place {
    fn named(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            context: None,
            kind,
            name: name.into(),
            url: None,
            description: None,
            address: None,
            geo: None,
            contained_in_place: None,
            keywords: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualLocation {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub url: String,
}

/// Event location: virtual and physical are exclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Location {
    Virtual(VirtualLocation),
    Physical(Place),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<&'static str>,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_served: Option<Place>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLd {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub event_status: &'static str,
    pub event_attendance_mode: &'static str,
    pub location: Location,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offers: Option<Offer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Organization>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebSite {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub position: usize,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub item_list_element: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPage {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    pub description: String,
    pub url: String,
    pub is_part_of: WebSite,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_entity: Option<ItemList>,
}

/// The entity-typed object of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityLd {
    Place(Place),
    Event(Box<EventLd>),
    Offer(Offer),
    Collection(CollectionPage),
}

impl EntityLd {
    /// The schema.org `@type`.
    pub fn kind(&self) -> &'static str {
        match self {
            EntityLd::Place(p) => p.kind,
            EntityLd::Event(e) => e.kind,
            EntityLd::Offer(o) => o.kind,
            EntityLd::Collection(c) => c.kind,
        }
    }
}

/// Builds breadcrumbs and entity objects for a site.
#[derive(Debug, Clone)]
pub struct StructuredDataBuilder {
    site: SiteConfig,
}

impl StructuredDataBuilder {
    pub fn new(site: SiteConfig) -> Self {
        Self { site }
    }

    /// Crumbs for a normalized path: `Home`, then one per segment.
    ///
    /// Facet tokens (`category`, `locality`) only extend the URL. The last
    /// crumb is named `leaf` when given.
    pub fn path_crumbs(&self, path: &str, leaf: Option<&str>) -> Vec<Crumb> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let vertical = segments.first().and_then(|s| Vertical::from_table(s));
        let mut crumbs = vec![Crumb {
            name: "Home".to_string(),
            url: self.site.url("/"),
        }];
        let mut prefix = String::new();
        let mut previous: Option<&str> = None;

        for (i, segment) in segments.iter().enumerate() {
            prefix.push('/');
            prefix.push_str(&urlencoding::encode(segment));
            let last = i + 1 == segments.len();
            let facet_token = matches!(*segment, "category" | "locality");
            if i > 0 && !last && vertical.is_some() && facet_token {
                previous = Some(*segment);
                continue;
            }

            let name = match (leaf, vertical) {
                (Some(leaf), _) if last => leaf.to_string(),
                (_, Some(v)) if i == 0 => v.label().to_string(),
                (_, Some(v)) if previous == Some("category") => v.facets().label_for(segment),
                _ if i == 0 && segment.eq_ignore_ascii_case(&self.site.city_slug) => {
                    self.site.city.clone()
                }
                _ => titleize(segment),
            };
            crumbs.push(Crumb {
                name,
                url: self.site.url(&prefix),
            });
            previous = Some(*segment);
        }
        crumbs
    }

    /// Breadcrumb list for a path.
    pub fn breadcrumb(&self, path: &str, leaf: Option<&str>) -> BreadcrumbList {
        build_breadcrumb(&self.path_crumbs(path, leaf))
    }

    /// Entity object, chosen by vertical.
    pub fn entity(&self, entity: &Entity, meta: &Metadata) -> EntityLd {
        match entity {
            Entity::Locality(locality) => EntityLd::Place(self.place(locality, meta)),
            Entity::Event(event) => EntityLd::Event(Box::new(self.event(event, meta))),
            Entity::Deal(deal) => EntityLd::Offer(self.deal(deal, meta)),
        }
    }

    fn city(&self) -> Place {
        Place::named("City", self.site.city.clone())
    }

    fn address(&self) -> PostalAddress {
        PostalAddress {
            kind: "PostalAddress",
            street_address: None,
            address_locality: None,
            postal_code: None,
            address_region: self.site.region.clone(),
            address_country: self.site.country.clone(),
        }
    }

    fn place(&self, locality: &LocalityEntity, meta: &Metadata) -> Place {
        let keywords = (!locality.tags.is_empty()).then(|| locality.tags.join(", "));
        Place {
            context: Some(SCHEMA_CONTEXT),
            url: Some(meta.canonical.clone()),
            description: Some(meta.description.clone()),
            address: Some(PostalAddress {
                address_locality: Some(self.site.city.clone()),
                postal_code: locality.pin_codes.first().cloned(),
                ..self.address()
            }),
            geo: GeoCoordinates::from_pair(locality.coordinates()),
            contained_in_place: Some(Box::new(self.city())),
            keywords,
            ..Place::named("Place", locality.display_name())
        }
    }

    fn event_location(&self, event: &EventEntity, url: &str) -> Location {
        if event.is_online {
            return Location::Virtual(VirtualLocation {
                kind: "VirtualLocation",
                url: non_blank(event.online_url.as_deref()).unwrap_or_else(|| url.to_string()),
            });
        }
        let city = non_blank(event.city.as_deref()).unwrap_or_else(|| self.site.city.clone());
        let locality = non_blank(event.locality.as_deref());
        let name = non_blank(event.venue_name.as_deref())
            .filter(|_| !event.venue_is_tbd())
            .or_else(|| locality.clone())
            .unwrap_or_else(|| city.clone());
        Location::Physical(Place {
            address: Some(PostalAddress {
                street_address: non_blank(event.venue_address.as_deref()),
                address_locality: Some(match &locality {
                    Some(locality) => format!("{locality}, {city}"),
                    None => city,
                }),
                ..self.address()
            }),
            geo: GeoCoordinates::from_pair(event.coordinates()),
            ..Place::named("Place", name)
        })
    }

    fn event(&self, event: &EventEntity, meta: &Metadata) -> EventLd {
        let url = meta.canonical.clone();
        let price = if event.is_free {
            Some(0.0)
        } else {
            event.ticket_price.filter(|p| *p > 0.0)
        };
        let offers = price.map(|price| Offer {
            context: None,
            kind: "Offer",
            name: None,
            description: None,
            category: None,
            price: Some(price),
            price_currency: Some(self.site.currency.clone()),
            availability: Some(IN_STOCK),
            url: Some(non_blank(event.registration_url.as_deref()).unwrap_or_else(|| url.clone())),
            area_served: None,
        });
        let organizer = non_blank(event.organizer_name.as_deref()).map(|name| Organization {
            kind: "Organization",
            name,
            email: non_blank(event.organizer_email.as_deref()),
            telephone: non_blank(event.organizer_phone.as_deref()),
        });
        EventLd {
            context: SCHEMA_CONTEXT,
            kind: "Event",
            name: event.display_title().to_string(),
            description: Some(meta.description.clone()),
            start_date: non_blank(event.start_date.as_deref()),
            end_date: non_blank(event.end_date.as_deref()),
            // Only visible events resolve, so every event is scheduled.
            event_status: EVENT_SCHEDULED,
            event_attendance_mode: if event.is_online {
                ONLINE_ATTENDANCE
            } else {
                OFFLINE_ATTENDANCE
            },
            location: self.event_location(event, &url),
            image: non_blank(event.cover_image.as_deref()).into_iter().collect(),
            offers,
            organizer,
            url,
        }
    }

    fn deal(&self, deal: &DealEntity, meta: &Metadata) -> Offer {
        let area = match non_blank(deal.locality.as_deref()) {
            Some(locality) => Place {
                contained_in_place: Some(Box::new(self.city())),
                ..Place::named("Place", locality)
            },
            None => self.city(),
        };
        Offer {
            context: Some(SCHEMA_CONTEXT),
            kind: "Offer",
            name: Some(deal.display_title()),
            description: Some(meta.description.clone()),
            category: non_blank(deal.category.as_deref())
                .map(|c| Vertical::Deal.facets().label_for(&c)),
            price: None,
            price_currency: None,
            availability: None,
            url: Some(meta.canonical.clone()),
            area_served: Some(area),
        }
    }

    /// `CollectionPage` with an `ItemList` of the listed items.
    pub fn collection(&self, page: &FacetPage, meta: &Metadata) -> EntityLd {
        let items: Vec<ListItem> = page
            .items
            .iter()
            .take(LISTED_ITEMS)
            .enumerate()
            .map(|(i, item)| ListItem {
                kind: "ListItem",
                position: i + 1,
                name: item.name.clone(),
                url: self.site.url(&item.path),
            })
            .collect();
        EntityLd::Collection(CollectionPage {
            context: SCHEMA_CONTEXT,
            kind: "CollectionPage",
            name: meta.title.clone(),
            description: meta.description.clone(),
            url: meta.canonical.clone(),
            is_part_of: WebSite {
                kind: "WebSite",
                name: self.site.site_name.clone(),
                url: self.site.url("/"),
            },
            main_entity: (!items.is_empty()).then(|| ItemList {
                kind: "ItemList",
                item_list_element: items,
            }),
        })
    }
}
