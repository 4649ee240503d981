//! Exact-path registry lookups.

use crate::error::{Error, Result};
use crate::fetch::Fetchers;
use crate::model::RegistryEntry;

/// Looks a path up in the page registry.
///
/// No pattern matching happens here; a miss is a valid `None` and only a
/// failed read is an error.
#[derive(Clone)]
pub struct RegistryResolver {
    fetchers: Fetchers,
}

impl RegistryResolver {
    /// Create a resolver over the given fetchers.
    pub fn new(fetchers: Fetchers) -> Self {
        Self { fetchers }
    }

    /// Registry row for `path`, if any.
    pub async fn resolve(&self, path: &str) -> Result<Option<RegistryEntry>> {
        self.fetchers
            .registry_entry(path)
            .await
            .map_err(Error::RegistryUnavailable)
    }
}
