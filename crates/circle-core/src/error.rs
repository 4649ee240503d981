//! Core error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a content store read.
///
/// An absent row is not an error; stores return `Ok(None)` for it.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Transport or query failure reaching the store.
    #[error("query failed: {0}")]
    Query(String),

    /// The read did not complete within the configured bound.
    #[error("read timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// Whether this error is a timeout rather than a hard failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout(_))
    }
}

/// Resolution errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The path has no resolvable, visible entity.
    #[error("no page resolves at {0}")]
    NotFound(String),

    /// The page registry could not be reached.
    #[error("page registry unavailable: {0}")]
    RegistryUnavailable(#[source] StoreError),

    /// A vertical table could not be reached.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] StoreError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for store reads.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result alias for resolution.
pub type Result<T> = std::result::Result<T, Error>;
