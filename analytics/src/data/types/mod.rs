//! Shared record and result types
//!
//! Raw records mirror what the ledger indexer writes; result types are what
//! the reporting layer serializes.

mod records;
mod stats;

pub use records::{FeeMetrics, InvocationMetrics, RawContractRecord, RawInvocationRecord};
pub use stats::{
    AggregateStatRecord, FeeAverages, FeeStatRecord, FeeTotals, GeneralStats, GroupedRow,
    RankedContract, ReferenceCount,
};
