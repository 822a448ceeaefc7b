//! Time-bucketed analytics over a ledger-indexing store
//!
//! Turns raw per-invocation and per-contract records indexed from the ledger
//! into display-ready reporting data: daily contract creation and upload
//! counts, per-metric execution cost averages, fee statistics, and
//! top-contract rankings by call volume.
//!
//! Layering:
//! - `core` - configuration and shared constants
//! - `data` - typed aggregation queries, collaborator traits, record and
//!   result types, and an in-memory reference backend
//! - `domain` - the aggregation/merge/resolve pipeline and the per-network
//!   stats service
//! - `utils` - day bucket math
//!
//! The storage engine and the address directory are collaborators consumed
//! through the traits in [`data::traits`]; HTTP routing and response caching
//! live in the embedding application.

pub mod core;
pub mod data;
pub mod domain;
pub mod utils;

pub use self::core::config::AnalyticsConfig;
pub use data::error::StoreError;
pub use data::memory::{MemoryDirectory, MemoryLedgerStore};
pub use data::traits::{AddressDirectory, Collection, LedgerStore, Source};
pub use data::types::{
    AggregateStatRecord, FeeStatRecord, GeneralStats, RankedContract, RawContractRecord,
    RawInvocationRecord,
};
pub use domain::AnalyticsError;
pub use domain::stats::ContractStatsService;
