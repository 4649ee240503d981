//! `robots.txt`.

use crate::config::SiteConfig;
use crate::model::Vertical;

/// Path of the sitemap index.
pub const SITEMAP_INDEX_PATH: &str = "/sitemap.xml";

/// Render the robots directive document.
///
/// Everything is allowed except the configured internal paths; the sitemap
/// index and each vertical sitemap are listed.
pub fn robots_txt(site: &SiteConfig) -> String {
    let mut lines = vec!["User-agent: *".to_string(), "Allow: /".to_string()];
    lines.extend(site.disallow.iter().map(|path| format!("Disallow: {path}")));
    lines.push(String::new());
    lines.push(format!("Sitemap: {}", site.url(SITEMAP_INDEX_PATH)));
    lines.extend(
        Vertical::ALL
            .iter()
            .map(|v| format!("Sitemap: {}", site.url(&format!("/{}", v.sitemap_file())))),
    );
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
