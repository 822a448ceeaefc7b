//! Shared constants

/// Aggregation bucket width: one UTC calendar day, in seconds.
pub const DAY: i64 = 86_400;

/// Default number of entries returned by top-contract rankings.
pub const DEFAULT_TOP_LIMIT: usize = 100;

/// Upper bound for caller-supplied ranking limits.
pub const MAX_TOP_LIMIT: usize = 1_000;
