//! Locality records.

use serde::{Deserialize, Serialize};

use crate::normalize::{de, LabeledText};

/// A neighbourhood of the city.
///
/// Rows are read through [`LocalityRow`], which folds the alternate
/// spellings some tables use for the same column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LocalityRow")]
pub struct LocalityEntity {
    pub id: Option<String>,
    pub slug: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub zone: Option<String>,
    pub ward: Option<String>,
    pub police_station: Option<String>,
    pub pin_codes: Vec<String>,
    pub assembly_constituency: Option<String>,
    pub population: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub micro_localities: Vec<String>,
    pub nearby_localities: Vec<String>,
    pub adjacent_localities: Vec<String>,
    pub landmarks: Vec<String>,
    pub connectivity: Vec<LabeledText>,
    pub tags: Vec<String>,
    pub short_description: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub updated_at: Option<String>,
}

/// Stored locality row. PIN codes appear as `pin_codes` (array) or
/// `pin_code` (string), coordinates as `latitude`/`longitude` or
/// `lat`/`lng`; a row may carry both spellings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocalityRow {
    #[serde(deserialize_with = "de::text")]
    id: Option<String>,
    #[serde(deserialize_with = "de::string")]
    slug: String,
    #[serde(deserialize_with = "de::text")]
    name: Option<String>,
    #[serde(deserialize_with = "de::text")]
    title: Option<String>,
    #[serde(deserialize_with = "de::text")]
    zone: Option<String>,
    #[serde(deserialize_with = "de::text")]
    ward: Option<String>,
    #[serde(deserialize_with = "de::text")]
    police_station: Option<String>,
    #[serde(deserialize_with = "de::list")]
    pin_codes: Vec<String>,
    #[serde(deserialize_with = "de::list")]
    pin_code: Vec<String>,
    #[serde(deserialize_with = "de::text")]
    assembly_constituency: Option<String>,
    #[serde(deserialize_with = "de::text")]
    population: Option<String>,
    #[serde(deserialize_with = "de::number")]
    latitude: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    lat: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    longitude: Option<f64>,
    #[serde(deserialize_with = "de::number")]
    lng: Option<f64>,
    #[serde(deserialize_with = "de::list")]
    micro_localities: Vec<String>,
    #[serde(deserialize_with = "de::list")]
    nearby_localities: Vec<String>,
    #[serde(deserialize_with = "de::list")]
    adjacent_localities: Vec<String>,
    #[serde(deserialize_with = "de::list")]
    landmarks: Vec<String>,
    #[serde(deserialize_with = "de::labelled")]
    connectivity: Vec<LabeledText>,
    #[serde(deserialize_with = "de::list")]
    tags: Vec<String>,
    #[serde(deserialize_with = "de::text")]
    short_description: Option<String>,
    #[serde(deserialize_with = "de::text")]
    meta_title: Option<String>,
    #[serde(deserialize_with = "de::text")]
    meta_description: Option<String>,
    #[serde(deserialize_with = "de::text")]
    updated_at: Option<String>,
}

impl From<LocalityRow> for LocalityEntity {
    fn from(row: LocalityRow) -> Self {
        let pin_codes = if row.pin_codes.is_empty() {
            row.pin_code
        } else {
            row.pin_codes
        };
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
            title: row.title,
            zone: row.zone,
            ward: row.ward,
            police_station: row.police_station,
            pin_codes,
            assembly_constituency: row.assembly_constituency,
            population: row.population,
            latitude: row.latitude.or(row.lat),
            longitude: row.longitude.or(row.lng),
            micro_localities: row.micro_localities,
            nearby_localities: row.nearby_localities,
            adjacent_localities: row.adjacent_localities,
            landmarks: row.landmarks,
            connectivity: row.connectivity,
            tags: row.tags,
            short_description: row.short_description,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            updated_at: row.updated_at,
        }
    }
}

impl LocalityEntity {
    /// Create a record with a slug and display name.
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Name, else title, else slug.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or(&self.slug)
    }

    /// Both coordinates, when present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Narrow listing row used by sitemaps and facet pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalitySummary {
    #[serde(deserialize_with = "de::string")]
    pub slug: String,
    #[serde(deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de::text")]
    pub updated_at: Option<String>,
}

impl LocalitySummary {
    /// Name, else slug.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }
}

impl From<&LocalityEntity> for LocalitySummary {
    fn from(locality: &LocalityEntity) -> Self {
        Self {
            slug: locality.slug.clone(),
            name: locality.name.clone().or_else(|| locality.title.clone()),
            updated_at: locality.updated_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_heterogeneous_row() {
        let row: LocalityEntity = serde_json::from_value(json!({
            "slug": "malviya-nagar",
            "name": "Malviya Nagar",
            "pin_code": ["302017", "302017"],
            "ward": 12,
            "lat": "26.8530",
            "lng": 75.8047,
            "landmarks": [{"name": "Gaurav Tower"}, "WTP", "gaurav tower"],
            "connectivity": {"metro": "Not on current line", "bus": ["AC-1", "AC-1"]},
            "unknown_column": {"ignored": true}
        }))
        .unwrap();

        assert_eq!(row.pin_codes, vec!["302017"]);
        assert_eq!(row.ward.as_deref(), Some("12"));
        assert_eq!(row.coordinates(), Some((26.853, 75.8047)));
        assert_eq!(row.landmarks, vec!["Gaurav Tower", "WTP"]);
        assert_eq!(row.connectivity.len(), 2);
        assert_eq!(row.display_name(), "Malviya Nagar");
    }

    #[test]
    fn test_both_column_spellings() {
        let row: LocalityEntity = serde_json::from_value(json!({
            "slug": "c-scheme",
            "pin_code": "302001",
            "pin_codes": ["302001", "302005"],
            "lat": 26.9,
            "latitude": "",
            "lng": 75.8,
            "longitude": 75.81
        }))
        .unwrap();
        assert_eq!(row.pin_codes, vec!["302001", "302005"]);
        assert_eq!(row.coordinates(), Some((26.9, 75.81)));

        let row: LocalityEntity =
            serde_json::from_value(json!({"slug": "c-scheme", "pin_code": 302001, "pin_codes": null}))
                .unwrap();
        assert_eq!(row.pin_codes, vec!["302001"]);
    }

    #[test]
    fn test_display_name_falls_back() {
        let mut row = LocalityEntity {
            slug: "bani-park".into(),
            ..LocalityEntity::default()
        };
        assert_eq!(row.display_name(), "bani-park");
        row.title = Some("Bani Park".into());
        assert_eq!(row.display_name(), "Bani Park");
        assert_eq!(row.coordinates(), None);
    }
}
