//! Analytics pipeline
//!
//! - `aggregate` - bucketed aggregation over one collection
//! - `normalize` - display rounding for invocation metrics
//! - `merge` - concurrent multi-source history merge
//! - `resolver` - per-request batched address resolution
//! - `ranking` - top-contract rankings
//! - `stats` - the per-network reporting service

pub mod aggregate;
pub mod merge;
pub mod normalize;
pub mod ranking;
pub mod resolver;
pub mod stats;

use thiserror::Error;

use crate::data::error::StoreError;
use crate::data::query::QueryError;

pub use resolver::AddressResolver;
pub use stats::ContractStatsService;

/// Failure taxonomy for analytics requests.
///
/// A request either completes in full or fails with one of these; partial
/// results are never returned.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Unknown network name, rejected before any query executes
    #[error("unknown network: {0}")]
    InvalidNetwork(String),

    /// Malformed aggregation query, rejected before dispatch
    #[error("invalid aggregation query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// Resolver contract violated by the calling code
    #[error("resolver misuse: {0}")]
    ResolverMisuse(&'static str),

    /// A store collaborator failed; propagated without retry
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AnalyticsError {
    /// True for failures caused by the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidNetwork(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_network_is_client_error() {
        assert!(AnalyticsError::InvalidNetwork("tesnet".into()).is_client_error());
        assert!(!AnalyticsError::ResolverMisuse("early resolve").is_client_error());
        assert!(!AnalyticsError::Store(StoreError::backend("down")).is_client_error());
    }
}
