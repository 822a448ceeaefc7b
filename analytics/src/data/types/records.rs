//! Raw records owned by the ledger-indexing store
//!
//! Records are immutable once indexed; this crate only reads them.

use serde::Deserialize;

/// One contract invocation, as indexed from the ledger
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInvocationRecord {
    /// Invocation timestamp, unix seconds
    pub ts: i64,
    /// Invoked contract reference; 0 or negative means "no target"
    pub contract: i64,
    /// Number of nested sub-invocations triggered by this call
    #[serde(default)]
    pub calls: u64,
    /// References invoked transitively, one entry per sub-invocation
    #[serde(default)]
    pub nested: Vec<i64>,
    /// Execution metering, all fields optional
    #[serde(default)]
    pub metrics: InvocationMetrics,
}

/// Execution metering attached to an invocation record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationMetrics {
    pub read_entry: Option<f64>,
    pub write_entry: Option<f64>,
    pub ledger_read_byte: Option<f64>,
    pub ledger_write_byte: Option<f64>,
    pub read_code_byte: Option<f64>,
    pub emit_event: Option<f64>,
    pub invoke_time_nsecs: Option<f64>,
    pub write_code_byte: Option<f64>,
    #[serde(default)]
    pub fee: FeeMetrics,
}

/// Fee charged for an invocation, split by component
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeeMetrics {
    pub nonrefundable: Option<f64>,
    pub refundable: Option<f64>,
    pub rent: Option<f64>,
}

/// One deployed contract, as indexed from the ledger
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContractRecord {
    /// Creation timestamp, unix seconds
    pub created: i64,
    /// True for Wasm contracts, false for asset contract wrappers
    #[serde(default)]
    pub wasm: bool,
    /// Running payment counter
    #[serde(default)]
    pub payments: u64,
    /// Running invocation counter
    #[serde(default)]
    pub invocations: u64,
}
