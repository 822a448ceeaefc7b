//! Collaborator traits for the indexing store and the address directory
//!
//! One [`LedgerStore`] exists per logical network. Collections execute the
//! typed queries from [`crate::data::query`]; the address directory turns
//! opaque numeric entity references into canonical addresses in one batch.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::data::error::StoreError;
use crate::data::query::{GroupedQuery, ReferenceCountQuery};
use crate::data::types::{GroupedRow, ReferenceCount};

/// Record collections addressable on a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Contracts,
    Invocations,
}

/// A queryable record collection
#[async_trait]
pub trait Collection: Send + Sync {
    /// Execute a grouped-reduction query.
    ///
    /// Returns one row per group in unspecified order; no two rows share a
    /// key. `Avg` reducers over a group with no present values emit no output
    /// field for that group.
    async fn grouped(&self, query: &GroupedQuery) -> Result<Vec<GroupedRow>, StoreError>;

    /// Count records per entity reference, drop sentinel references (<= 0),
    /// sort descending by count with a deterministic tie order, truncate to
    /// the query limit.
    async fn count_by_reference(
        &self,
        query: &ReferenceCountQuery,
    ) -> Result<Vec<ReferenceCount>, StoreError>;
}

/// Batched reference-to-address lookup.
///
/// An id omitted from the result mapping is unresolvable, not an error.
#[async_trait]
pub trait AddressDirectory: Send + Sync {
    async fn resolve_batch(
        &self,
        ids: &BTreeSet<i64>,
    ) -> Result<FxHashMap<i64, String>, StoreError>;
}

/// Everything the pipeline needs from one logical network
pub trait LedgerStore: Send + Sync {
    fn collection(&self, source: Source) -> Arc<dyn Collection>;
    fn directory(&self) -> Arc<dyn AddressDirectory>;
}
