//! Shape-based vertical inference for paths the registry does not know yet.
//!
//! Rules are plain data evaluated in order; the first match wins. A rule set
//! is checked at construction so that no path can be claimed by two
//! verticals.

use crate::error::{Error, Result};
use crate::model::Vertical;

/// A prefix/shape rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRule {
    /// Required first segment.
    pub prefix: String,
    /// Required segment count, prefix included.
    pub segments: usize,
    /// Vertical of the matched entity.
    pub vertical: Vertical,
}

impl FallbackRule {
    /// Two-segment rule: `/{prefix}/{slug}`.
    pub fn new(prefix: impl Into<String>, vertical: Vertical) -> Self {
        Self {
            prefix: prefix.into(),
            segments: 2,
            vertical,
        }
    }

    fn overlaps(&self, other: &FallbackRule) -> bool {
        self.segments == other.segments && self.prefix.eq_ignore_ascii_case(&other.prefix)
    }

    fn matches(&self, segments: &[&str]) -> bool {
        segments.len() == self.segments
            && segments
                .first()
                .is_some_and(|first| first.eq_ignore_ascii_case(&self.prefix))
    }
}

/// Outcome of a rule match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inferred {
    pub vertical: Vertical,
    pub slug: String,
}

/// Ordered fallback rule set.
#[derive(Debug, Clone)]
pub struct FallbackRules {
    rules: Vec<FallbackRule>,
}

impl FallbackRules {
    /// Default rules for a city hub slug.
    ///
    /// `/{city}/{slug}` and `/localities/{slug}` are localities,
    /// `/events/{slug}` events and `/deals/{slug}` deals.
    pub fn new(city_slug: &str) -> Result<Self> {
        Self::from_rules(vec![
            FallbackRule::new(city_slug, Vertical::Locality),
            FallbackRule::new(Vertical::Locality.table(), Vertical::Locality),
            FallbackRule::new(Vertical::Event.table(), Vertical::Event),
            FallbackRule::new(Vertical::Deal.table(), Vertical::Deal),
        ])
    }

    /// Validate and wrap an explicit rule list.
    pub fn from_rules(rules: Vec<FallbackRule>) -> Result<Self> {
        for (i, rule) in rules.iter().enumerate() {
            if rule.prefix.trim().is_empty() || rule.segments < 2 {
                return Err(Error::Config(format!(
                    "fallback rule {i} needs a prefix and at least two segments"
                )));
            }
            if let Some(other) = rules[..i]
                .iter()
                .find(|other| other.overlaps(rule) && other.vertical != rule.vertical)
            {
                return Err(Error::Config(format!(
                    "fallback prefix /{} is claimed by both {} and {}",
                    rule.prefix, other.vertical, rule.vertical
                )));
            }
        }
        Ok(Self { rules })
    }

    /// The rules, in evaluation order.
    pub fn rules(&self) -> &[FallbackRule] {
        &self.rules
    }

    /// Infer the vertical and slug of a normalized path.
    pub fn infer_vertical(&self, path: &str) -> Option<Inferred> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let rule = self.rules.iter().find(|rule| rule.matches(&segments))?;
        let slug = segments.last()?.trim();
        if slug.is_empty() {
            return None;
        }
        Some(Inferred {
            vertical: rule.vertical,
            slug: slug.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = FallbackRules::new("jaipur").unwrap();
        let cases = [
            ("/jaipur/malviya-nagar", Some((Vertical::Locality, "malviya-nagar"))),
            ("/localities/bani-park", Some((Vertical::Locality, "bani-park"))),
            ("/events/jlf-2026", Some((Vertical::Event, "jlf-2026"))),
            ("/deals/half-off", Some((Vertical::Deal, "half-off"))),
            ("/Jaipur/c-scheme", Some((Vertical::Locality, "c-scheme"))),
            ("/jaipur", None),
            ("/events", None),
            ("/events/category/music", None),
            ("/delhi/saket", None),
            ("/", None),
        ];
        for (path, expected) in cases {
            let got = rules
                .infer_vertical(path)
                .map(|i| (i.vertical, i.slug));
            assert_eq!(
                got,
                expected.map(|(v, s)| (v, s.to_string())),
                "{path}"
            );
        }
    }

    #[test]
    fn test_no_path_matches_two_verticals() {
        let rules = FallbackRules::new("jaipur").unwrap();
        for path in [
            "/jaipur/a",
            "/localities/a",
            "/events/a",
            "/deals/a",
            "/x/y",
        ] {
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let mut verticals: Vec<Vertical> = rules
                .rules()
                .iter()
                .filter(|r| r.matches(&segments))
                .map(|r| r.vertical)
                .collect();
            verticals.dedup();
            assert!(verticals.len() <= 1, "{path}");
        }
    }

    #[test]
    fn test_colliding_city_token_is_rejected() {
        assert!(matches!(FallbackRules::new("events"), Err(Error::Config(_))));
        assert!(matches!(FallbackRules::new("Deals"), Err(Error::Config(_))));
        // Same vertical twice is redundant, not ambiguous.
        assert!(FallbackRules::new("localities").is_ok());
        assert!(matches!(FallbackRules::new(""), Err(Error::Config(_))));
    }

    #[test]
    fn test_first_match_wins() {
        let rules = FallbackRules::from_rules(vec![
            FallbackRule::new("guides", Vertical::Locality),
            FallbackRule {
                prefix: "guides".into(),
                segments: 3,
                vertical: Vertical::Event,
            },
        ])
        .unwrap();
        assert_eq!(
            rules.infer_vertical("/guides/x/y").map(|i| i.vertical),
            Some(Vertical::Event)
        );
        assert_eq!(
            rules.infer_vertical("/guides/x").map(|i| i.slug),
            Some("x".to_string())
        );
    }
}
