//! Site and sitemap configuration.
//!
//! Both values are built once by the process and injected into the
//! components that need them; nothing in this crate reads the environment.

use std::time::Duration;

/// Default public origin.
pub const DEFAULT_ORIGIN: &str = "https://www.jaipurcircle.com";

/// Default city display name.
pub const DEFAULT_CITY: &str = "Jaipur";

/// Default site name used in titles and structured data.
pub const DEFAULT_SITE_NAME: &str = "JaipurCircle";

/// Default per-read timeout against the content store.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Default cap on localities listed into a sitemap.
pub const DEFAULT_LOCALITY_CAP: usize = 2_000;

/// Default cap on entities (events, registry rows) listed into a sitemap.
pub const DEFAULT_ENTITY_CAP: usize = 5_000;

/// Paths robots are asked not to crawl.
pub const DEFAULT_DISALLOW: [&str; 3] = ["/admin", "/auth", "/settings"];

/// Public site identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Absolute origin without a trailing slash (e.g. `https://www.jaipurcircle.com`).
    pub origin: String,
    /// City display name.
    pub city: String,
    /// City path token (`/jaipur/...`).
    pub city_slug: String,
    /// Region for postal addresses.
    pub region: String,
    /// ISO country code for postal addresses.
    pub country: String,
    /// Site name.
    pub site_name: String,
    /// ISO currency code for offers.
    pub currency: String,
    /// Paths disallowed in robots.txt.
    pub disallow: Vec<String>,
}

impl SiteConfig {
    /// Create a configuration for the given origin with default city settings.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: trim_origin(origin.into()),
            city: DEFAULT_CITY.to_string(),
            city_slug: crate::normalize::slugify(DEFAULT_CITY),
            region: "Rajasthan".to_string(),
            country: "IN".to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            currency: "INR".to_string(),
            disallow: DEFAULT_DISALLOW.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Set the city; the path token follows unless set explicitly afterwards.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self.city_slug = crate::normalize::slugify(&self.city);
        self
    }

    /// Set the city path token.
    pub fn with_city_slug(mut self, slug: impl Into<String>) -> Self {
        self.city_slug = slug.into();
        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the site name.
    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = name.into();
        self
    }

    /// Replace the disallowed robots paths.
    pub fn with_disallow(mut self, paths: Vec<String>) -> Self {
        self.disallow = paths;
        self
    }

    /// Absolute URL for a site-relative path.
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() || path == "/" {
            format!("{}/", self.origin)
        } else if path.starts_with('/') {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}/{}", self.origin, path)
        }
    }

    /// Site-relative path of an absolute URL on this origin, if it is one.
    pub fn local_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        let rest = url.strip_prefix(self.origin.as_str())?;
        match rest {
            "" => Some("/"),
            r if r.starts_with('/') => Some(r),
            _ => None,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

fn trim_origin(origin: String) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

/// Sitemap generation bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SitemapConfig {
    /// Maximum localities crossed with facet categories.
    pub locality_cap: usize,
    /// Maximum events or registry rows listed.
    pub entity_cap: usize,
}

impl SitemapConfig {
    /// Set the locality cap.
    pub fn with_locality_cap(mut self, cap: usize) -> Self {
        self.locality_cap = cap;
        self
    }

    /// Set the entity cap.
    pub fn with_entity_cap(mut self, cap: usize) -> Self {
        self.entity_cap = cap;
        self
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            locality_cap: DEFAULT_LOCALITY_CAP,
            entity_cap: DEFAULT_ENTITY_CAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_trimmed() {
        let site = SiteConfig::new("https://example.test/ ");
        assert_eq!(site.origin, "https://example.test");
        assert_eq!(site.url("/events"), "https://example.test/events");
        assert_eq!(site.url("events"), "https://example.test/events");
        assert_eq!(site.url("/"), "https://example.test/");
    }

    #[test]
    fn test_local_path() {
        let site = SiteConfig::new("https://example.test");
        assert_eq!(site.local_path("https://example.test/a/b"), Some("/a/b"));
        assert_eq!(site.local_path("https://example.test"), Some("/"));
        assert_eq!(site.local_path("https://example.testing/a"), None);
        assert_eq!(site.local_path("https://other.test/a"), None);
    }

    #[test]
    fn test_city_builder() {
        let site = SiteConfig::default().with_city("Navi Mumbai");
        assert_eq!(site.city_slug, "navi-mumbai");
        let site = site.with_city_slug("mumbai");
        assert_eq!(site.city_slug, "mumbai");
    }
}
