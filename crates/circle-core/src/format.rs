//! Display formatting for dates, prices and truncated text.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Ellipsis appended to truncated text.
pub const ELLIPSIS: char = '…';

/// Parse the timestamp shapes found in stored rows.
///
/// Accepts RFC 3339, Postgres' `YYYY-MM-DD HH:MM:SS[.f]+HH[:MM]`, naive
/// date-times and bare dates. Naive values are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, pattern) {
            return Some(dt);
        }
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// `Sun, 01 Mar 2026`, in the timestamp's own offset.
pub fn date_label(value: &str) -> Option<String> {
    parse_timestamp(value).map(|dt| dt.format("%a, %d %b %Y").to_string())
}

/// `07:00 PM – 10:00 PM (Asia/Kolkata)`, or `All day`.
pub fn time_range(
    start: Option<&str>,
    end: Option<&str>,
    timezone: Option<&str>,
    all_day: bool,
) -> Option<String> {
    if all_day {
        return Some("All day".to_string());
    }
    let start = parse_timestamp(start?)?;
    let mut out = start.format("%I:%M %p").to_string();
    if let Some(end) = end.and_then(parse_timestamp) {
        out.push_str(" – ");
        out.push_str(&end.format("%I:%M %p").to_string());
    }
    if let Some(tz) = timezone.map(str::trim).filter(|tz| !tz.is_empty()) {
        out.push_str(&format!(" ({tz})"));
    }
    Some(out)
}

/// Sitemap `lastmod` value: UTC, second precision.
pub fn lastmod(value: &str) -> Option<String> {
    parse_timestamp(value).map(|dt| {
        dt.with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    })
}

/// The current instant as a `lastmod` value.
pub fn now_lastmod() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `499` → `₹499`, `499.5` → `₹499.50`.
pub fn price(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("₹{amount:.0}")
    } else {
        format!("₹{amount:.2}")
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters, marker included.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let kept: String = text.chars().take(max - 1).collect();
    let mut out = kept.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        for value in [
            "2026-03-01T19:00:00+05:30",
            "2026-03-01 19:00:00.123456+05:30",
            "2026-03-01 19:00:00+05",
            "2026-03-01T19:00:00",
            "2026-03-01",
        ] {
            assert!(parse_timestamp(value).is_some(), "{value}");
        }
        assert!(parse_timestamp("next friday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_labels() {
        assert_eq!(date_label("2026-03-01T19:00:00+05:30").as_deref(), Some("Sun, 01 Mar 2026"));
        assert_eq!(
            time_range(
                Some("2026-03-01T19:00:00+05:30"),
                Some("2026-03-01T22:30:00+05:30"),
                Some("Asia/Kolkata"),
                false
            )
            .as_deref(),
            Some("07:00 PM – 10:30 PM (Asia/Kolkata)")
        );
        assert_eq!(time_range(None, None, None, true).as_deref(), Some("All day"));
        assert_eq!(time_range(None, None, None, false), None);
        assert_eq!(
            lastmod("2026-03-01T19:00:00+05:30").as_deref(),
            Some("2026-03-01T13:30:00Z")
        );
        assert_eq!(price(499.0), "₹499");
        assert_eq!(price(99.5), "₹99.50");
    }

    #[test]
    fn test_truncate_counts_the_marker() {
        let long = "a".repeat(300);
        let out = truncate(&long, 160);
        assert_eq!(out.chars().count(), 160);
        assert!(out.ends_with(ELLIPSIS));
        assert_eq!(truncate("short", 160), "short");
        let multibyte = "₹".repeat(200);
        assert!(truncate(&multibyte, 160).chars().count() <= 160);
        assert_eq!(collapse_whitespace("  a \n b  "), "a b");
    }
}
