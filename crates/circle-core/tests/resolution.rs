//! Integration tests for path resolution, metadata and sitemaps.

use std::sync::Arc;
use std::time::Duration;

use circle_core::model::{EventEntity, EventStatus, IndexState, LocalityEntity, PageType};
use circle_core::normalize::text_list;
use circle_core::resolve::{PageContent, Source};
use circle_core::store::Table;
use circle_core::{
    Entity, Error, Fetchers, MemoryStore, RegistryEntry, Resolver, SiteConfig, SitemapAggregator,
    SitemapConfig, Vertical,
};
use serde_json::json;

const FIXTURES: &str = r#"{
    "registry": [
        {
            "url_path": "/jaipur/malviya-nagar",
            "page_type": "locality",
            "canonical_url": null,
            "index_state": null
        },
        {
            "url_path": "/jaipur/old-city-walk",
            "page_type": "locality",
            "entity_key": "walled-city",
            "index_state": "noindex"
        },
        {
            "url_path": "/localities/c-scheme",
            "page_type": "locality",
            "canonical_url": "https://www.jaipurcircle.com/jaipur/c-scheme"
        },
        {
            "url_path": "/about",
            "page_type": "static"
        }
    ],
    "localities": [
        {"slug": "malviya-nagar", "name": "Malviya Nagar", "pin_codes": ["302017", "302017"]},
        {"slug": "walled-city", "name": "Walled City", "pin_code": 302002},
        {"slug": "c-scheme", "name": "C-Scheme"},
        {"slug": "bani-park", "name": "Bani Park", "zone": "Civil Lines"}
    ],
    "events": [
        {
            "slug": "jazz-night",
            "title": "Jazz Night",
            "status": "published",
            "category": "music",
            "locality": "Malviya Nagar",
            "start_date": "2099-03-01T19:00:00+05:30",
            "venue_name": "JKK",
            "ticket_price": "499"
        },
        {
            "slug": "secret-gig",
            "title": "Secret Gig",
            "status": "draft"
        }
    ],
    "deals": [
        {"slug": "latte-deal", "title": "Latte Deal", "category": "cafes", "locality": "Bani Park"}
    ]
}"#;

struct TestContext {
    site: SiteConfig,
    fetchers: Fetchers,
}

impl TestContext {
    fn new() -> Self {
        Self::with_store(MemoryStore::from_json_str(FIXTURES).unwrap())
    }

    fn with_store(store: MemoryStore) -> Self {
        Self {
            site: SiteConfig::default(),
            fetchers: Fetchers::new(Arc::new(store)).with_read_timeout(Duration::from_millis(200)),
        }
    }

    fn resolver(&self) -> Resolver {
        Resolver::new(self.fetchers.clone(), self.site.clone()).unwrap()
    }

    fn sitemaps(&self) -> SitemapAggregator {
        SitemapAggregator::new(self.fetchers.clone(), self.site.clone(), SitemapConfig::default())
    }
}

fn fixtures() -> MemoryStore {
    MemoryStore::from_json_str(FIXTURES).unwrap()
}

#[tokio::test]
async fn test_registry_locality_end_to_end() {
    let ctx = TestContext::new();
    let page = ctx.resolver().resolve("/jaipur/malviya-nagar").await.unwrap();

    assert_eq!(page.source, Source::Registry);
    assert_eq!(
        page.metadata.canonical,
        "https://www.jaipurcircle.com/jaipur/malviya-nagar"
    );
    assert_eq!(page.metadata.robots.to_string(), "index, follow");
    match &page.content {
        PageContent::Entity(Entity::Locality(locality)) => {
            assert_eq!(locality.pin_codes, vec!["302017"]);
        }
        other => panic!("unexpected content: {other:?}"),
    }
    assert!(page.redirect_target(&ctx.site).is_none());
    assert_eq!(page.structured_data.kind(), "Place");
    let names: Vec<&str> = page
        .breadcrumb
        .item_list_element
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(names, vec!["Home", "Jaipur", "Malviya Nagar"]);
}

#[tokio::test]
async fn test_missing_slugs_are_not_found() {
    let resolver = TestContext::new().resolver();
    for path in [
        "/jaipur/vaishali-nagar",
        "/localities/vaishali-nagar",
        "/events/no-such-event",
        "/deals/no-such-deal",
        "/events/secret-gig",
        "/nowhere/at/all",
        "/",
    ] {
        match resolver.resolve(path).await {
            Err(Error::NotFound(_)) => {}
            other => panic!("{path}: expected NotFound, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_fallback_resolves_unregistered_entities() {
    let resolver = TestContext::new().resolver();
    let page = resolver.resolve("/jaipur/bani-park/").await.unwrap();
    assert_eq!(page.source, Source::Fallback);
    assert_eq!(page.path, "/jaipur/bani-park");
    assert_eq!(page.metadata.robots.to_string(), "index, follow");

    let page = resolver.resolve("/events/jazz-night").await.unwrap();
    assert_eq!(page.source, Source::Fallback);
    assert_eq!(page.structured_data.kind(), "Event");
    assert!(page.metadata.title.starts_with("Jazz Night — Jaipur — "));
    let paths: Vec<&str> = page.related.iter().map(|l| l.path.as_str()).collect();
    assert!(paths.contains(&"/jaipur/malviya-nagar"));
    assert!(paths.contains(&"/events/category/music"));

    let page = resolver.resolve("/deals/latte-deal").await.unwrap();
    assert_eq!(page.structured_data.kind(), "Offer");
    assert!(page.related.iter().any(|l| l.path == "/deals/locality/bani-park"));
}

#[tokio::test]
async fn test_registry_directives() {
    let ctx = TestContext::new();
    let resolver = ctx.resolver();

    let page = resolver.resolve("/jaipur/old-city-walk").await.unwrap();
    assert_eq!(page.metadata.robots.to_string(), "index: false, follow: false");
    assert_eq!(page.content, PageContent::Entity(Entity::Locality({
        let mut l = LocalityEntity::new("walled-city", "Walled City");
        l.pin_codes = vec!["302002".into()];
        l
    })));

    let page = resolver.resolve("/localities/c-scheme").await.unwrap();
    assert_eq!(page.metadata.canonical, "https://www.jaipurcircle.com/jaipur/c-scheme");
    assert_eq!(page.redirect_target(&ctx.site).as_deref(), Some("/jaipur/c-scheme"));
}

#[tokio::test]
async fn test_canonical_spelling_variants_do_not_redirect() {
    for canonical in [
        "https://www.jaipurcircle.com/jaipur/bani-park/",
        "https://www.jaipurcircle.com/jaipur/bani-park?utm_source=x",
        "https://www.jaipurcircle.com/jaipur/bani%2Dpark",
    ] {
        let store = fixtures().with_registry_entry(
            RegistryEntry::new("/jaipur/bani-park", PageType::Locality).with_canonical_url(canonical),
        );
        let ctx = TestContext::with_store(store);
        let page = ctx.resolver().resolve("/jaipur/bani-park").await.unwrap();
        assert_eq!(page.source, Source::Registry);
        assert!(page.redirect_target(&ctx.site).is_none(), "{canonical}");
    }
}

#[tokio::test]
async fn test_locality_alias_canonicalizes_to_city_path() {
    let ctx = TestContext::new();
    let page = ctx.resolver().resolve("/localities/bani-park").await.unwrap();
    assert_eq!(page.source, Source::Fallback);
    assert_eq!(page.metadata.canonical, "https://www.jaipurcircle.com/jaipur/bani-park");
    assert_eq!(page.redirect_target(&ctx.site).as_deref(), Some("/jaipur/bani-park"));

    let page = ctx.resolver().resolve("/jaipur/bani-park").await.unwrap();
    assert!(page.redirect_target(&ctx.site).is_none());
}

#[tokio::test]
async fn test_non_ascii_slug_canonical_matches_sitemap() {
    let mut holi = EventEntity::new("holi-फेस्ट", "Holi Fest");
    holi.status = EventStatus::Published;
    holi.start_date = Some("2099-03-14T10:00:00+05:30".into());
    let ctx = TestContext::with_store(fixtures().with_event(holi));

    let sitemap = ctx.sitemaps().build(Vertical::Event).await;
    let loc = sitemap
        .urls
        .iter()
        .map(|u| u.loc.as_str())
        .find(|loc| loc.contains("/events/holi-"))
        .unwrap();
    assert!(loc.is_ascii());

    let page = ctx.resolver().resolve(ctx.site.local_path(loc).unwrap()).await.unwrap();
    assert_eq!(page.metadata.canonical, loc);
    assert_eq!(page.metadata.open_graph.url, loc);
    assert!(page.redirect_target(&ctx.site).is_none());
}

#[tokio::test]
async fn test_registry_row_without_entity_is_not_found() {
    let store = fixtures()
        .with_registry_entry(RegistryEntry::new("/events/gone", PageType::Event));
    let resolver = TestContext::with_store(store).resolver();
    assert!(matches!(
        resolver.resolve("/events/gone").await,
        Err(Error::NotFound(_))
    ));
    // Page types rendered elsewhere fall through to the other layers.
    assert!(matches!(resolver.resolve("/about").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_registry_outage_uses_fallback_rules() {
    let store = fixtures().with_outage(Table::Registry);
    let resolver = TestContext::with_store(store).resolver();
    let page = resolver.resolve("/jaipur/malviya-nagar").await.unwrap();
    assert_eq!(page.source, Source::Fallback);
    assert!(page.registry.is_none());
}

#[tokio::test]
async fn test_entity_outage_is_not_coerced_to_not_found() {
    let store = fixtures().with_outage(Table::Events);
    let resolver = TestContext::with_store(store).resolver();
    assert!(matches!(
        resolver.resolve("/events/jazz-night").await,
        Err(Error::UpstreamUnavailable(_))
    ));
}

#[tokio::test]
async fn test_timeout_reads_as_not_found() {
    let store = fixtures().with_latency(Duration::from_millis(100));
    let fetchers = Fetchers::new(Arc::new(store)).with_read_timeout(Duration::from_millis(5));
    let resolver = Resolver::new(fetchers, SiteConfig::default()).unwrap();
    assert!(matches!(
        resolver.resolve("/jaipur/bani-park").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_facet_pages() {
    let resolver = TestContext::new().resolver();

    let page = resolver.resolve("/events/category/music/locality/malviya-nagar").await.unwrap();
    assert_eq!(page.source, Source::Facet);
    assert_eq!(page.metadata.title, "Music Events in Malviya Nagar | JaipurCircle");
    assert_eq!(page.structured_data.kind(), "CollectionPage");
    match &page.content {
        PageContent::Facet(facet) => {
            assert_eq!(facet.items.len(), 1);
            assert_eq!(facet.items[0].path, "/events/jazz-night");
        }
        other => panic!("unexpected content: {other:?}"),
    }

    let page = resolver.resolve("/jaipur").await.unwrap();
    assert_eq!(page.related.len(), 3);

    for path in [
        "/events/locality/vaishali-nagar",
        "/events/category/knitting",
        "/deals/category/cafes/locality/nowhere",
    ] {
        assert!(
            matches!(resolver.resolve(path).await, Err(Error::NotFound(_))),
            "{path}"
        );
    }
}

#[tokio::test]
async fn test_every_sitemap_url_resolves() {
    let ctx = TestContext::new();
    let resolver = ctx.resolver();
    let sitemaps = ctx.sitemaps();
    for vertical in Vertical::ALL {
        let sitemap = sitemaps.build(vertical).await;
        assert!(sitemap.diagnostic.is_none());
        for url in &sitemap.urls {
            let path = ctx.site.local_path(&url.loc).unwrap();
            assert!(resolver.resolve(path).await.is_ok(), "{path}");
        }
    }
}

#[tokio::test]
async fn test_sitemap_survives_failed_listing() {
    let store = fixtures().with_outage(Table::Localities);
    let sitemap = TestContext::with_store(store).sitemaps().build(Vertical::Deal).await;
    let xml = sitemap.render();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<urlset"));
    assert!(xml.contains("<!--"));
    assert!(xml.contains("<loc>https://www.jaipurcircle.com/deals</loc>"));
    assert!(xml.contains("<loc>https://www.jaipurcircle.com/deals/category/cafes</loc>"));
    assert!(xml.trim_end().ends_with("</urlset>"));
}

#[test]
fn test_normalizer_is_idempotent() {
    let once = text_list(&json!(["A", "a", "B"]));
    assert_eq!(once, vec!["A", "B"]);
    let twice = text_list(&json!(once));
    assert_eq!(twice, once);
}

#[tokio::test]
async fn test_hidden_events_never_resolve_by_registry() {
    let mut cancelled = EventEntity::new("called-off", "Called Off");
    cancelled.status = EventStatus::Cancelled;
    let store = MemoryStore::new().with_event(cancelled).with_registry_entry(
        RegistryEntry::new("/events/called-off", PageType::Event)
            .with_index_state(IndexState::Index),
    );
    let resolver = TestContext::with_store(store).resolver();
    assert!(matches!(
        resolver.resolve("/events/called-off").await,
        Err(Error::NotFound(_))
    ));
}
