//! Narrow column contracts.
//!
//! Listings and lookups select only the columns the rendering paths need,
//! never `*`. The locality page is the exception: its descriptive columns
//! vary between deployments, so it converts the whole row and lets the
//! model ignore what it does not know.

/// `page_registry` columns.
pub const REGISTRY_COLUMNS: &[&str] = &[
    "url_path",
    "page_type",
    "entity_table",
    "entity_id",
    "entity_key",
    "canonical_url",
    "index_state",
    "title",
    "updated_at",
    "last_published_at",
];

/// `localities` columns for listings.
pub const LOCALITY_SUMMARY_COLUMNS: &[&str] = &["slug", "name", "updated_at"];

/// `events` columns.
pub const EVENT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "slug",
    "short_description",
    "description",
    "start_date",
    "end_date",
    "timezone",
    "is_all_day",
    "venue_name",
    "venue_address",
    "locality",
    "category",
    "tags",
    "cover_image",
    "is_free",
    "ticket_price",
    "registration_url",
    "registration_deadline",
    "status",
    "updated_at",
    "published_at",
    "meta_title",
    "meta_description",
    "is_online",
    "online_url",
    "latitude",
    "longitude",
    "organizer_name",
    "organizer_email",
    "organizer_phone",
];

/// `deals` columns.
pub const DEAL_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "title",
    "category",
    "locality",
    "description",
    "meta_title",
    "meta_description",
    "updated_at",
];

/// Comma-separated select list.
pub fn select_list(columns: &[&str]) -> String {
    columns.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_explicit() {
        for columns in [
            REGISTRY_COLUMNS,
            LOCALITY_SUMMARY_COLUMNS,
            EVENT_COLUMNS,
            DEAL_COLUMNS,
        ] {
            assert!(!columns.contains(&"*"));
            assert!(columns.contains(&"slug") || columns.contains(&"url_path"));
            let mut unique = columns.to_vec();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), columns.len());
        }
        assert_eq!(select_list(LOCALITY_SUMMARY_COLUMNS), "slug, name, updated_at");
    }
}
