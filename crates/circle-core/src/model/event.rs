//! Event records.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::normalize::de;

/// Statuses whose events may be resolved or listed.
pub const VISIBLE_EVENT_STATUSES: [&str; 3] = ["published", "active", "live"];

/// Publication status of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventStatus {
    #[default]
    Draft,
    Published,
    Active,
    Live,
    Cancelled,
    Other(String),
}

impl EventStatus {
    /// Stored spelling.
    pub fn as_str(&self) -> &str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Active => "active",
            EventStatus::Live => "live",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Other(s) => s,
        }
    }

    /// Whether events in this status are public.
    pub fn is_visible(&self) -> bool {
        VISIBLE_EVENT_STATUSES.contains(&self.as_str())
    }
}

impl From<&str> for EventStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "draft" => EventStatus::Draft,
            "published" => EventStatus::Published,
            "active" => EventStatus::Active,
            "live" => EventStatus::Live,
            "cancelled" | "canceled" => EventStatus::Cancelled,
            other => EventStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for EventStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(EventStatus::from(de::string(deserializer)?.as_str()))
    }
}

/// An event listed on the site.
///
/// `locality` is free text typed by whoever created the event; it is not a
/// reference to a locality row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventEntity {
    #[serde(deserialize_with = "de::text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "de::string")]
    pub slug: String,
    #[serde(deserialize_with = "de::text")]
    pub title: Option<String>,
    pub status: EventStatus,
    #[serde(deserialize_with = "de::text")]
    pub short_description: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub meta_title: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub meta_description: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub timezone: Option<String>,
    #[serde(deserialize_with = "de::flag")]
    pub is_all_day: bool,
    #[serde(deserialize_with = "de::text")]
    pub venue_name: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub venue_address: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub locality: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub city: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "de::list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "de::text")]
    pub cover_image: Option<String>,
    #[serde(deserialize_with = "de::flag")]
    pub is_free: bool,
    #[serde(deserialize_with = "de::number")]
    pub ticket_price: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub registration_url: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub registration_deadline: Option<String>,
    #[serde(deserialize_with = "de::flag")]
    pub is_online: bool,
    #[serde(deserialize_with = "de::text")]
    pub online_url: Option<String>,
    #[serde(deserialize_with = "de::number")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "de::text")]
    pub organizer_name: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub organizer_email: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub organizer_phone: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub updated_at: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub published_at: Option<String>,
}

impl EventEntity {
    /// Create a published event.
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: Some(title.into()),
            status: EventStatus::Published,
            ..Self::default()
        }
    }

    /// Title, else `Event`.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Event")
    }

    /// Short description, else the long one.
    pub fn summary(&self) -> Option<&str> {
        self.short_description
            .as_deref()
            .or(self.description.as_deref())
    }

    /// Both coordinates, when present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Whether the venue is still a placeholder.
    pub fn venue_is_tbd(&self) -> bool {
        self.venue_name
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains("to be announced"))
    }

    /// Last-modified timestamp for sitemaps.
    pub fn lastmod(&self) -> Option<&str> {
        self.updated_at
            .as_deref()
            .or(self.published_at.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visible_statuses() {
        for status in ["published", "Active", " live "] {
            assert!(EventStatus::from(status).is_visible(), "{status}");
        }
        for status in ["draft", "cancelled", "archived", ""] {
            assert!(!EventStatus::from(status).is_visible(), "{status}");
        }
    }

    #[test]
    fn test_row_with_loose_types() {
        let row: EventEntity = serde_json::from_value(json!({
            "id": 42,
            "slug": "jlf-2026",
            "title": "Jaipur Literature Festival",
            "status": "published",
            "is_free": "false",
            "ticket_price": "499",
            "tags": "books",
            "latitude": 26.9,
            "longitude": null
        }))
        .unwrap();
        assert_eq!(row.id.as_deref(), Some("42"));
        assert!(row.status.is_visible());
        assert!(!row.is_free);
        assert_eq!(row.ticket_price, Some(499.0));
        assert_eq!(row.tags, vec!["books"]);
        assert_eq!(row.coordinates(), None);
    }

    #[test]
    fn test_missing_status_is_hidden() {
        let row: EventEntity = serde_json::from_value(json!({"slug": "x"})).unwrap();
        assert_eq!(row.status, EventStatus::Draft);
        assert!(!row.status.is_visible());
    }
}
