//! Per-request batched address resolution
//!
//! One resolver is constructed per logical request and discarded with it, so
//! no resolved address outlives the request that fetched it. References are
//! collected first, deduplicated, fetched in a single directory batch, and
//! only then read back synchronously.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::data::traits::AddressDirectory;
use crate::domain::AnalyticsError;

/// Deduplicating batch resolver for numeric entity references
pub struct AddressResolver {
    directory: Arc<dyn AddressDirectory>,
    requested: BTreeSet<i64>,
    resolved: FxHashMap<i64, String>,
    fetched: bool,
}

impl AddressResolver {
    pub fn new(directory: Arc<dyn AddressDirectory>) -> Self {
        Self {
            directory,
            requested: BTreeSet::new(),
            resolved: FxHashMap::default(),
            fetched: false,
        }
    }

    /// Mark a reference for resolution. Idempotent; sentinel references
    /// (<= 0) are never sent to the directory and are silently ignored here.
    pub fn request(&mut self, id: i64) {
        if id > 0 {
            self.requested.insert(id);
        }
    }

    /// Perform the single batched directory lookup for everything requested.
    ///
    /// Callable once per resolver; a resolver with no pending references
    /// performs no lookup at all.
    pub async fn fetch_all(&mut self) -> Result<(), AnalyticsError> {
        if self.fetched {
            return Err(AnalyticsError::ResolverMisuse(
                "batch fetch already completed",
            ));
        }
        self.fetched = true;
        if self.requested.is_empty() {
            return Ok(());
        }
        self.resolved = self.directory.resolve_batch(&self.requested).await?;
        Ok(())
    }

    /// Canonical address for a previously requested reference.
    ///
    /// Sentinel references resolve to `None` without any lookup. `None` is
    /// also returned for a requested id the directory could not resolve.
    /// Calling this before [`fetch_all`](Self::fetch_all), or for an id that
    /// was never requested, is a contract violation.
    pub fn resolve(&self, id: i64) -> Result<Option<&str>, AnalyticsError> {
        if id <= 0 {
            return Ok(None);
        }
        if !self.fetched {
            return Err(AnalyticsError::ResolverMisuse(
                "resolve called before batch fetch",
            ));
        }
        if !self.requested.contains(&id) {
            return Err(AnalyticsError::ResolverMisuse(
                "resolve called for an id that was never requested",
            ));
        }
        Ok(self.resolved.get(&id).map(String::as_str))
    }
}
