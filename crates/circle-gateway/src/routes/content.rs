//! Content pages.
//!
//! Every path not claimed by another route is resolved through the
//! [`Resolver`](circle_core::Resolver) and served as an HTML document. The
//! same resolution is exposed as JSON under `/api/pages/`.

use axum::{
    extract::{Path, State},
    http::{header, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use circle_core::resolve::{encode_path, normalize_path};
use circle_core::ResolvedPage;
use serde::Serialize;

use crate::error::AppError;
use crate::render;
use crate::AppState;

static X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// JSON form of a resolved page.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    #[serde(flatten)]
    pub page: ResolvedPage,
    /// Same-origin canonical path the HTML route redirects to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// Content routes. Installs the router fallback.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/pages/*path", get(page_json))
        .fallback(page_html)
}

async fn page_json(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<PageResponse>, AppError> {
    let page = state.resolver.resolve(&format!("/{path}")).await?;
    let redirect = page.redirect_target(state.resolver.site());
    Ok(Json(PageResponse { page, redirect }))
}

async fn page_html(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path();
    if path.len() > 1 && path.ends_with('/') {
        return Redirect::permanent(&without_trailing_slash(&uri)).into_response();
    }

    let page = match state.resolver.resolve(path).await {
        Ok(page) => page,
        Err(e) => return error_document(AppError::from(e)),
    };

    if let Some(target) = page.redirect_target(state.resolver.site()) {
        tracing::debug!(path = %page.path, target = %target, "redirecting to canonical");
        return (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, target)],
        )
            .into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (X_ROBOTS_TAG.clone(), page.metadata.robots.meta_content()),
        ],
        render::page_document(&page),
    )
        .into_response()
}

/// Request target with trailing and repeated slashes removed, query
/// preserved. The result is always a single-slash local path.
fn without_trailing_slash(uri: &Uri) -> String {
    let path = encode_path(&normalize_path(uri.path()));
    match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}

fn error_document(err: AppError) -> Response {
    let (title, message) = match &err {
        AppError::NotFound(_) => ("Page not found", "There is no page at this address."),
        AppError::Internal(_) => ("Something went wrong", "Please try again in a moment."),
    };
    (
        err.status(),
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        render::status_document(title, message),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_trailing_slash() {
        let uri: Uri = "/events/jazz-night/?ref=home".parse().unwrap();
        assert_eq!(without_trailing_slash(&uri), "/events/jazz-night?ref=home");
        let uri: Uri = "/jaipur//".parse().unwrap();
        assert_eq!(without_trailing_slash(&uri), "/jaipur");
        let uri: Uri = "//evil.example/".parse().unwrap();
        assert_eq!(without_trailing_slash(&uri), "/evil.example");
        let uri: Uri = "/events/holi%20fest/".parse().unwrap();
        assert_eq!(without_trailing_slash(&uri), "/events/holi%20fest");
    }
}
