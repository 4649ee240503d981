//! Sitemap aggregation and XML rendering.
//!
//! Each vertical gets its own `<urlset>`. Facet verticals cross their static
//! category catalog with the locality listing; events add one URL per
//! visible event; localities prefer registry rows and fall back to the
//! table. A failed listing never fails the document: the static part is
//! still emitted, with a diagnostic comment.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;

use crate::config::{SiteConfig, SitemapConfig};
use crate::fetch::Fetchers;
use crate::format;
use crate::model::{EventEntity, LocalitySummary, PageType, RegistryEntry, Vertical};
use crate::resolve::{encode_path, normalize_path};
use crate::store::EventQuery;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const LOCALITIES_UNAVAILABLE: &str =
    "locality listing unavailable; collection and category URLs only";
const EVENTS_UNAVAILABLE: &str = "event listing unavailable; facet URLs only";
const NO_LOCALITY_SOURCE: &str = "locality sources unavailable; no URLs emitted";

/// `<changefreq>` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Daily,
    Weekly,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
        }
    }
}

/// One `<url>` record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapUrl {
    pub loc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

impl SitemapUrl {
    fn new(loc: String, changefreq: ChangeFreq, priority: f32) -> Self {
        Self {
            loc,
            lastmod: None,
            changefreq,
            priority,
        }
    }

    fn with_lastmod(mut self, lastmod: Option<&str>) -> Self {
        self.lastmod = lastmod.and_then(format::lastmod);
        self
    }
}

/// A per-vertical sitemap document.
#[derive(Debug, Clone, PartialEq)]
pub struct Sitemap {
    pub vertical: Vertical,
    pub urls: Vec<SitemapUrl>,
    /// Set when a listing failed and the document is partial.
    pub diagnostic: Option<String>,
}

impl Sitemap {
    fn new(vertical: Vertical) -> Self {
        Self {
            vertical,
            urls: Vec::new(),
            diagnostic: None,
        }
    }

    /// Append URLs, dropping locations already present.
    fn extend(&mut self, urls: impl IntoIterator<Item = SitemapUrl>) {
        let mut seen: HashSet<String> = self.urls.iter().map(|u| u.loc.clone()).collect();
        for url in urls {
            if seen.insert(url.loc.clone()) {
                self.urls.push(url);
            }
        }
    }

    /// Render the `<urlset>` document.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(128 + self.urls.len() * 160);
        let _ = writeln!(out, "{XML_DECLARATION}");
        let _ = writeln!(out, r#"<urlset xmlns="{SITEMAP_NS}">"#);
        if let Some(diagnostic) = &self.diagnostic {
            let _ = writeln!(out, "<!-- {} -->", comment_text(diagnostic));
        }
        for url in &self.urls {
            out.push_str("  <url>\n");
            let _ = writeln!(out, "    <loc>{}</loc>", escape(&url.loc));
            if let Some(lastmod) = &url.lastmod {
                let _ = writeln!(out, "    <lastmod>{}</lastmod>", escape(lastmod));
            }
            let _ = writeln!(out, "    <changefreq>{}</changefreq>", url.changefreq.as_str());
            let _ = writeln!(out, "    <priority>{:.1}</priority>", url.priority);
            out.push_str("  </url>\n");
        }
        out.push_str("</urlset>\n");
        out
    }
}

/// One `<sitemap>` entry of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapRef {
    pub loc: String,
    pub lastmod: String,
}

/// Render a `<sitemapindex>` document.
pub fn render_index(entries: &[SitemapRef]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{XML_DECLARATION}");
    let _ = writeln!(out, r#"<sitemapindex xmlns="{SITEMAP_NS}">"#);
    for entry in entries {
        out.push_str("  <sitemap>\n");
        let _ = writeln!(out, "    <loc>{}</loc>", escape(&entry.loc));
        let _ = writeln!(out, "    <lastmod>{}</lastmod>", escape(&entry.lastmod));
        out.push_str("  </sitemap>\n");
    }
    out.push_str("</sitemapindex>\n");
    out
}

/// Escape XML text content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Comment text: no `--` and no trailing `-`.
fn comment_text(text: &str) -> String {
    let mut out = text.replace('-', " - ");
    while out.contains("  ") {
        out = out.replace("  ", " ");
    }
    out.trim().trim_end_matches('-').trim_end().to_string()
}

/// Builds sitemap documents from the vertical listings.
#[derive(Clone)]
pub struct SitemapAggregator {
    fetchers: Fetchers,
    site: SiteConfig,
    config: SitemapConfig,
}

impl SitemapAggregator {
    pub fn new(fetchers: Fetchers, site: SiteConfig, config: SitemapConfig) -> Self {
        Self {
            fetchers,
            site,
            config,
        }
    }

    /// The sitemap index: one entry per vertical, stamped now.
    pub fn build_index(&self) -> Vec<SitemapRef> {
        let lastmod = format::now_lastmod();
        Vertical::ALL
            .iter()
            .map(|v| SitemapRef {
                loc: self.site.url(&format!("/{}", v.sitemap_file())),
                lastmod: lastmod.clone(),
            })
            .collect()
    }

    /// The URL set of a vertical. Never fails.
    pub async fn build(&self, vertical: Vertical) -> Sitemap {
        match vertical {
            Vertical::Deal => self.build_deals().await,
            Vertical::Event => self.build_events().await,
            Vertical::Locality => self.build_localities().await,
        }
    }

    /// Collection, category, locality and category × locality URLs.
    pub fn facet_urls(&self, vertical: Vertical, localities: &[LocalitySummary]) -> Vec<SitemapUrl> {
        let catalog = vertical.facets();
        let url = |category: Option<&str>, locality: Option<&str>| {
            self.site.url(&vertical.facet_path(category, locality))
        };

        let mut urls = vec![SitemapUrl::new(url(None, None), ChangeFreq::Daily, 0.8)];
        urls.extend(
            catalog
                .categories
                .iter()
                .map(|c| SitemapUrl::new(url(Some(c.key), None), ChangeFreq::Weekly, 0.7)),
        );
        if !catalog.locality_scoped {
            return urls;
        }
        for locality in localities {
            urls.push(
                SitemapUrl::new(url(None, Some(&locality.slug)), ChangeFreq::Weekly, 0.6)
                    .with_lastmod(locality.updated_at.as_deref()),
            );
        }
        for category in catalog.categories {
            for locality in localities {
                urls.push(SitemapUrl::new(
                    url(Some(category.key), Some(&locality.slug)),
                    ChangeFreq::Weekly,
                    0.5,
                ));
            }
        }
        urls
    }

    async fn build_deals(&self) -> Sitemap {
        let mut sitemap = Sitemap::new(Vertical::Deal);
        let localities = match self.fetchers.localities(self.config.locality_cap).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(sitemap = "deals", error = %e, "locality listing failed, degrading");
                sitemap.diagnostic = Some(LOCALITIES_UNAVAILABLE.to_string());
                Vec::new()
            }
        };
        sitemap.extend(self.facet_urls(Vertical::Deal, &localities));
        sitemap
    }

    async fn build_events(&self) -> Sitemap {
        let mut sitemap = Sitemap::new(Vertical::Event);
        let query = EventQuery::new(self.config.entity_cap);
        let (localities, events) = tokio::join!(
            self.fetchers.localities(self.config.locality_cap),
            self.fetchers.events(&query),
        );

        let mut diagnostics = Vec::new();
        let localities = localities.unwrap_or_else(|e| {
            tracing::warn!(sitemap = "events", error = %e, "locality listing failed, degrading");
            diagnostics.push(LOCALITIES_UNAVAILABLE);
            Vec::new()
        });
        let events = events.unwrap_or_else(|e| {
            tracing::warn!(sitemap = "events", error = %e, "event listing failed, degrading");
            diagnostics.push(EVENTS_UNAVAILABLE);
            Vec::new()
        });
        if !diagnostics.is_empty() {
            sitemap.diagnostic = Some(diagnostics.join("; "));
        }

        sitemap.extend(self.facet_urls(Vertical::Event, &localities));
        sitemap.extend(events.iter().map(|e| self.event_url(e)));
        sitemap
    }

    fn event_url(&self, event: &EventEntity) -> SitemapUrl {
        SitemapUrl::new(
            self.site.url(&Vertical::Event.entity_path(&self.site, &event.slug)),
            ChangeFreq::Weekly,
            0.7,
        )
        .with_lastmod(event.lastmod())
    }

    fn registry_url(&self, entry: &RegistryEntry) -> SitemapUrl {
        let loc = entry
            .canonical()
            .map(str::to_string)
            .unwrap_or_else(|| self.site.url(&encode_path(&normalize_path(&entry.path))));
        SitemapUrl::new(loc, ChangeFreq::Weekly, 0.6).with_lastmod(
            entry
                .updated_at
                .as_deref()
                .or(entry.last_published_at.as_deref()),
        )
    }

    async fn build_localities(&self) -> Sitemap {
        let mut sitemap = Sitemap::new(Vertical::Locality);
        let cap = self.config.locality_cap;

        match self.fetchers.registry_entries(&PageType::Locality, cap).await {
            Ok(entries) if !entries.is_empty() => {
                sitemap.extend(entries.iter().map(|e| self.registry_url(e)));
                return sitemap;
            }
            Ok(_) => tracing::debug!("no locality registry rows, using the localities table"),
            Err(e) => {
                tracing::warn!(sitemap = "localities", error = %e, "registry listing failed, using the localities table")
            }
        }

        match self.fetchers.localities(cap).await {
            Ok(rows) => sitemap.extend(rows.iter().map(|l| {
                SitemapUrl::new(
                    self.site.url(&Vertical::Locality.entity_path(&self.site, &l.slug)),
                    ChangeFreq::Weekly,
                    0.6,
                )
                .with_lastmod(l.updated_at.as_deref())
            })),
            Err(e) => {
                tracing::warn!(sitemap = "localities", error = %e, "locality listing failed, emitting an empty urlset");
                sitemap.diagnostic = Some(NO_LOCALITY_SOURCE.to_string());
            }
        }
        sitemap
    }
}
