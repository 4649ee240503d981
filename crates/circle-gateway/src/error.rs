//! Error handling for the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error type.
///
/// Bodies never carry internal detail; the cause is logged instead.
#[derive(Debug, Error)]
pub enum AppError {
    /// No page at the path.
    #[error("not found: {0}")]
    NotFound(String),
    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Response status.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: &'static str,
    /// Error message.
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::NotFound(_) => ("NOT_FOUND", "page not found"),
            AppError::Internal(_) => ("INTERNAL_ERROR", "something went wrong"),
        };

        let body = ErrorResponse {
            error: true,
            code,
            message,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<circle_core::Error> for AppError {
    fn from(err: circle_core::Error) -> Self {
        match err {
            circle_core::Error::NotFound(path) => AppError::NotFound(path),
            other => {
                tracing::error!(error = %other, "page resolution failed");
                AppError::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circle_core::StoreError;

    #[test]
    fn test_resolution_errors_map_to_status() {
        let err = AppError::from(circle_core::Error::NotFound("/x".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::from(circle_core::Error::UpstreamUnavailable(StoreError::Query(
            "connection refused".into(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
