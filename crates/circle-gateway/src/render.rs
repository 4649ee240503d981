//! HTML documents for content pages.
//!
//! Only the document head is significant: title, description, canonical,
//! robots, Open Graph and the JSON-LD scripts. The body is a bare outline of
//! the page.

use std::fmt::Write;

use circle_core::resolve::{PageContent, ResolvedPage};
use circle_core::sitemap::escape;
use serde::Serialize;

/// JSON for a `<script>` element; `</` is escaped so the data cannot close it.
fn script_json<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json.replace("</", "<\\/")),
        Err(e) => {
            tracing::warn!(error = %e, "structured data not serializable");
            None
        }
    }
}

fn head(out: &mut String, page: &ResolvedPage) {
    let meta = &page.metadata;
    let og = &meta.open_graph;
    out.push_str("<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(&meta.title));
    let _ = writeln!(out, "<meta name=\"description\" content=\"{}\">", escape(&meta.description));
    let _ = writeln!(out, "<link rel=\"canonical\" href=\"{}\">", escape(&meta.canonical));
    let _ = writeln!(out, "<meta name=\"robots\" content=\"{}\">", meta.robots.meta_content());
    let _ = writeln!(out, "<meta property=\"og:title\" content=\"{}\">", escape(&og.title));
    let _ = writeln!(
        out,
        "<meta property=\"og:description\" content=\"{}\">",
        escape(&og.description)
    );
    let _ = writeln!(out, "<meta property=\"og:url\" content=\"{}\">", escape(&og.url));
    let _ = writeln!(out, "<meta property=\"og:site_name\" content=\"{}\">", escape(&og.site_name));
    let _ = writeln!(out, "<meta property=\"og:type\" content=\"{}\">", og.kind);
    if let Some(image) = &og.image {
        let _ = writeln!(out, "<meta property=\"og:image\" content=\"{}\">", escape(image));
    }
    let _ = writeln!(out, "<meta name=\"twitter:card\" content=\"{}\">", og.twitter_card());

    let scripts = [script_json(&page.breadcrumb), script_json(&page.structured_data)];
    for json in scripts.into_iter().flatten() {
        let _ = writeln!(out, "<script type=\"application/ld+json\">{json}</script>");
    }
    out.push_str("</head>\n");
}

fn body(out: &mut String, page: &ResolvedPage) {
    out.push_str("<body>\n<nav aria-label=\"Breadcrumb\"><ol>\n");
    for crumb in &page.breadcrumb.item_list_element {
        let _ = writeln!(
            out,
            "<li><a href=\"{}\">{}</a></li>",
            escape(&crumb.item),
            escape(&crumb.name)
        );
    }
    out.push_str("</ol></nav>\n<main>\n");
    let _ = writeln!(out, "<h1>{}</h1>", escape(&page.heading()));
    let _ = writeln!(out, "<p>{}</p>", escape(&page.metadata.description));

    if let PageContent::Facet(facet) = &page.content {
        links(out, facet.items.iter().map(|i| (i.path.as_str(), i.name.as_str())));
    }
    if !page.related.is_empty() {
        out.push_str("<aside>\n");
        links(out, page.related.iter().map(|l| (l.path.as_str(), l.label.as_str())));
        out.push_str("</aside>\n");
    }
    out.push_str("</main>\n</body>\n");
}

fn links<'a>(out: &mut String, items: impl Iterator<Item = (&'a str, &'a str)>) {
    out.push_str("<ul>\n");
    for (href, label) in items {
        let _ = writeln!(out, "<li><a href=\"{}\">{}</a></li>", escape(href), escape(label));
    }
    out.push_str("</ul>\n");
}

/// Full document for a resolved page.
pub fn page_document(page: &ResolvedPage) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n");
    head(&mut out, page);
    body(&mut out, page);
    out.push_str("</html>\n");
    out
}

/// Minimal document for error statuses.
pub fn status_document(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<meta name=\"robots\" content=\"noindex, nofollow\">\n</head>\n\
         <body>\n<main>\n<h1>{title}</h1>\n<p>{message}</p>\n</main>\n</body>\n</html>\n",
        title = escape(title),
        message = escape(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_json_cannot_close_element() {
        let json = script_json(&serde_json::json!({"name": "</script><b>"})).unwrap();
        assert!(!json.contains("</script>"));
        assert!(json.contains("<\\/script>"));
    }

    #[test]
    fn test_status_document_escapes() {
        let doc = status_document("Not found", "No page at /a<b>");
        assert!(doc.contains("<h1>Not found</h1>"));
        assert!(doc.contains("/a&lt;b&gt;"));
        assert!(doc.contains("noindex, nofollow"));
    }
}
