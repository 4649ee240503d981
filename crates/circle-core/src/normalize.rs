//! Coercion of heterogeneous stored field shapes into display strings.
//!
//! Upstream rows store logically identical fields as a scalar, an array, or
//! a nested object (`{"name": ...}`) depending on who wrote them. Every value
//! read from a store passes through here, mostly via the serde adapters in
//! [`de`], so the rest of the crate only ever sees `Vec<String>` / `String`.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Number, Value};

/// Keys consulted, in order, when a nested object stands in for a string.
const OBJECT_TEXT_KEYS: [&str; 3] = ["name", "title", "label"];

/// Separator used when a list is rendered as a single string.
pub const LIST_SEPARATOR: &str = ", ";

/// Normalize a value into trimmed, non-empty display strings.
///
/// Duplicates are removed case-insensitively; the first-seen spelling and
/// order are kept. Null and unrecognisable shapes yield an empty list.
pub fn text_list(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    collect(value, &mut out, &mut seen);
    out
}

/// Normalize a value into a single display string.
pub fn display_text(value: &Value) -> String {
    text_list(value).join(LIST_SEPARATOR)
}

/// Deduplicate an already-textual sequence with the same rules as [`text_list`].
pub fn dedup<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for item in items {
        push_unique(item.as_ref(), &mut out, &mut seen);
    }
    out
}

fn collect(value: &Value, out: &mut Vec<String>, seen: &mut HashSet<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => push_unique(s, out, seen),
        Value::Number(n) => push_unique(&number_text(n), out, seen),
        Value::Bool(b) => push_unique(if *b { "true" } else { "false" }, out, seen),
        Value::Array(items) => {
            for item in items {
                collect(item, out, seen);
            }
        }
        Value::Object(map) => {
            let text = OBJECT_TEXT_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .find(|v| !matches!(v, Value::Null));
            match text {
                Some(inner) => collect(inner, out, seen),
                None => tracing::debug!(
                    keys = ?map.keys().collect::<Vec<_>>(),
                    "object field has no text key; skipped"
                ),
            }
        }
    }
}

fn push_unique(raw: &str, out: &mut Vec<String>, seen: &mut HashSet<String>) {
    let text = raw.trim();
    if text.is_empty() {
        return;
    }
    if seen.insert(text.to_lowercase()) {
        out.push(text.to_string());
    }
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// A display string with an optional label, e.g. `Metro: Sindhi Camp (2 km)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledText {
    /// Humanised key the text was stored under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// The text itself.
    pub text: String,
}

impl std::fmt::Display for LabeledText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}: {}", label, self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Normalize a map-or-list field into labelled entries.
///
/// Objects without a `name`/`title`/`label` key are read as `key → value`
/// maps; every other shape yields unlabelled entries.
pub fn labelled_list(value: &Value) -> Vec<LabeledText> {
    match value {
        Value::Object(map) if !OBJECT_TEXT_KEYS.iter().any(|k| map.contains_key(*k)) => map
            .iter()
            .filter_map(|(key, v)| {
                let text = display_text(v);
                (!text.is_empty()).then(|| LabeledText {
                    label: Some(humanize_key(key)),
                    text,
                })
            })
            .collect(),
        other => text_list(other)
            .into_iter()
            .map(|text| LabeledText { label: None, text })
            .collect(),
    }
}

/// `bus_stops` / `bus-stops` → `Bus stops`.
pub fn humanize_key(key: &str) -> String {
    let spaced = key.trim().replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `event-tickets` → `Event Tickets`.
pub fn titleize(s: &str) -> String {
    s.replace('-', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-case, `&` → `and`, runs of anything else → a single `-`.
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase().replace('&', " and ");
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Whether `s` already has slug shape (`[a-z0-9]+(-[a-z0-9]+)*`).
pub fn looks_like_slug(s: &str) -> bool {
    !s.is_empty()
        && s.split('-').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

/// Serde adapters applying the normalizer at deserialization time.
///
/// None of these fail on a well-formed JSON value; a malformed field
/// degrades to its empty form instead of rejecting the row.
pub mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{display_text, labelled_list, text_list, LabeledText};

    /// Any shape → deduplicated list.
    pub fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(text_list).unwrap_or_default())
    }

    /// Any shape → optional single string (lists joined).
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .map(display_text)
            .filter(|s| !s.is_empty()))
    }

    /// Any shape → string, empty when absent.
    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(text(deserializer)?.unwrap_or_default())
    }

    /// Number or numeric string → `f64`.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|f| f.is_finite()))
    }

    /// Boolean-ish → `bool`, `false` when absent or unrecognised.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => {
                matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
            }
            _ => false,
        })
    }

    /// Map or list → labelled entries.
    pub fn labelled<'de, D>(deserializer: D) -> Result<Vec<LabeledText>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(labelled_list).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_insensitive_dedup_keeps_first_spelling() {
        assert_eq!(text_list(&json!(["A", "a", "B"])), vec!["A", "B"]);
    }

    #[test]
    fn test_scalar_and_array_are_equivalent() {
        assert_eq!(text_list(&json!("302017")), text_list(&json!(["302017"])));
        assert_eq!(text_list(&json!(["302017", "302017"])), vec!["302017"]);
        assert_eq!(text_list(&json!(302017)), vec!["302017"]);
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let value = json!([
            {"name": "Gaurav Tower"},
            {"title": "WTP"},
            ["  Jawahar Circle  ", {"label": "gaurav tower"}],
            {"id": 4},
            null,
            "",
            true
        ]);
        assert_eq!(
            text_list(&value),
            vec!["Gaurav Tower", "WTP", "Jawahar Circle", "true"]
        );
    }

    #[test]
    fn test_null_yields_empty() {
        assert!(text_list(&Value::Null).is_empty());
        assert_eq!(display_text(&Value::Null), "");
        assert_eq!(display_text(&json!({})), "");
    }

    #[test]
    fn test_idempotent() {
        let once = text_list(&json!([" Bapu Nagar", "bapu nagar ", 7.0, 2.5, "Tonk Road"]));
        assert_eq!(once, vec!["Bapu Nagar", "7", "2.5", "Tonk Road"]);
        let twice = text_list(&json!(once.clone()));
        assert_eq!(once, twice);
        assert_eq!(dedup(&once), once);
    }

    #[test]
    fn test_labelled_list() {
        let map = json!({"metro": "Sindhi Camp", "bus_stops": ["Gopalpura", "Gopalpura"]});
        let mut rendered: Vec<String> = labelled_list(&map).iter().map(|e| e.to_string()).collect();
        rendered.sort();
        assert_eq!(rendered, vec!["Bus stops: Gopalpura", "Metro: Sindhi Camp"]);

        let plain = labelled_list(&json!(["Airport 8 km"]));
        assert_eq!(plain[0].label, None);
        assert_eq!(plain[0].text, "Airport 8 km");
    }

    #[test]
    fn test_slug_helpers() {
        assert_eq!(slugify("  Malviya Nagar "), "malviya-nagar");
        assert_eq!(slugify("C-Scheme & MI Road"), "c-scheme-and-mi-road");
        assert_eq!(slugify("--"), "");
        assert!(looks_like_slug("malviya-nagar"));
        assert!(looks_like_slug("sector-7"));
        assert!(!looks_like_slug("Malviya Nagar"));
        assert!(!looks_like_slug("a--b"));
        assert!(!looks_like_slug("-a"));
        assert!(!looks_like_slug(""));
        assert_eq!(titleize("event-tickets"), "Event Tickets");
        assert_eq!(humanize_key("bus_stops"), "Bus stops");
    }

    #[derive(Debug, serde::Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "de::list")]
        pins: Vec<String>,
        #[serde(default, deserialize_with = "de::text")]
        ward: Option<String>,
        #[serde(default, deserialize_with = "de::number")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "de::flag")]
        free: bool,
    }

    #[test]
    fn test_serde_adapters_never_reject_rows() {
        let row: Row = serde_json::from_value(json!({
            "pins": "302017",
            "ward": {"name": "Ward 12"},
            "price": "499",
            "free": "yes"
        }))
        .unwrap();
        assert_eq!(row.pins, vec!["302017"]);
        assert_eq!(row.ward.as_deref(), Some("Ward 12"));
        assert_eq!(row.price, Some(499.0));
        assert!(row.free);

        let row: Row = serde_json::from_value(json!({
            "pins": null,
            "ward": [],
            "price": {"amount": 3},
            "free": null
        }))
        .unwrap();
        assert!(row.pins.is_empty());
        assert_eq!(row.ward, None);
        assert_eq!(row.price, None);
        assert!(!row.free);

        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert!(row.pins.is_empty());
    }
}
