//! `robots.txt`.

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use circle_core::robots::robots_txt;

use crate::AppState;

/// Robots routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/robots.txt", get(robots))
}

async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_txt(state.resolver.site()),
    )
}
