//! Sitemap index and per-vertical sitemaps.
//!
//! Sitemaps always answer 200 with a well-formed document; a failed listing
//! only shrinks the URL set.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use circle_core::robots::SITEMAP_INDEX_PATH;
use circle_core::sitemap::render_index;
use circle_core::Vertical;

use crate::AppState;

/// Cache policy for sitemap documents.
pub const SITEMAP_CACHE_CONTROL: &str = "public, max-age=600, s-maxage=600";

/// Sitemap routes: the index plus one document per vertical.
pub fn routes() -> Router<AppState> {
    let mut router = Router::new().route(SITEMAP_INDEX_PATH, get(index));
    for vertical in Vertical::ALL {
        router = router.route(
            &format!("/{}", vertical.sitemap_file()),
            get(move |State(state): State<AppState>| vertical_sitemap(state, vertical)),
        );
    }
    router
}

fn xml(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/xml; charset=utf-8"),
            (header::CACHE_CONTROL, SITEMAP_CACHE_CONTROL),
        ],
        body,
    )
        .into_response()
}

async fn index(State(state): State<AppState>) -> Response {
    xml(render_index(&state.sitemaps.build_index()))
}

async fn vertical_sitemap(state: AppState, vertical: Vertical) -> Response {
    let sitemap = state.sitemaps.build(vertical).await;
    tracing::debug!(
        vertical = %vertical,
        urls = sitemap.urls.len(),
        degraded = sitemap.diagnostic.is_some(),
        "built sitemap"
    );
    xml(sitemap.render())
}
