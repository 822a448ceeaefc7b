//! Typed grouped-reduction query builder
//!
//! Aggregation requests are described by explicit configuration structs built
//! from an enumerated set of reducer kinds and field expressions, and are
//! validated before they are dispatched to the store. This keeps the query
//! surface closed: a backend only ever has to understand the variants below.

use thiserror::Error;

/// Source fields addressable by reducers and group keys.
///
/// Covers both record collections; a collection yields no value for a field
/// it does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    // contract records
    Created,
    Wasm,
    Payments,
    Invocations,
    // invocation records
    Ts,
    Calls,
    ReadEntry,
    WriteEntry,
    LedgerReadByte,
    LedgerWriteByte,
    ReadCodeByte,
    EmitEvent,
    InvokeTimeNsecs,
    WriteCodeByte,
    FeeNonrefundable,
    FeeRefundable,
    FeeRent,
}

/// A field with an optional linear rescale, applied before accumulation.
///
/// Division before averaging is equivalent to dividing the average; applying
/// it here keeps display rounding a single, final step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueExpr {
    pub field: Field,
    pub divide_by: Option<f64>,
}

impl ValueExpr {
    /// Field value taken as-is
    pub fn field(field: Field) -> Self {
        Self {
            field,
            divide_by: None,
        }
    }

    /// Field value divided by a constant
    pub fn scaled(field: Field, divisor: f64) -> Self {
        Self {
            field,
            divide_by: Some(divisor),
        }
    }
}

/// Per-record condition for conditional counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// The field carries a value
    IsSet(Field),
    /// The field carries no value
    NotSet(Field),
    /// The field carries a value other than zero
    NonZero(Field),
}

/// Accumulation applied per group for one output field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReducerKind {
    /// Number of records in the group
    Count,
    /// Sum of present values; a group with no values sums to zero
    Sum(ValueExpr),
    /// Mean of present values; a group with no values yields no output field
    Avg(ValueExpr),
    /// Number of records matching the predicate
    CountIf(Predicate),
}

/// Named accumulation: one reducer produces one output field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reducer {
    pub output: &'static str,
    pub kind: ReducerKind,
}

impl Reducer {
    pub fn count(output: &'static str) -> Self {
        Self {
            output,
            kind: ReducerKind::Count,
        }
    }

    pub fn sum(output: &'static str, field: Field) -> Self {
        Self {
            output,
            kind: ReducerKind::Sum(ValueExpr::field(field)),
        }
    }

    pub fn avg(output: &'static str, expr: ValueExpr) -> Self {
        Self {
            output,
            kind: ReducerKind::Avg(expr),
        }
    }

    pub fn count_if(output: &'static str, predicate: Predicate) -> Self {
        Self {
            output,
            kind: ReducerKind::CountIf(predicate),
        }
    }
}

/// Grouping applied before reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// Single group over the whole collection
    All,
    /// One group per `floor(value / 86400)` of the named timestamp field
    DayBucket(Field),
}

/// A grouped-reduction query against one record collection
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedQuery {
    pub key: GroupKey,
    pub reducers: Vec<Reducer>,
}

impl GroupedQuery {
    pub fn new(key: GroupKey, reducers: Vec<Reducer>) -> Self {
        Self { key, reducers }
    }

    /// Reject malformed queries before they reach a backend
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.reducers.is_empty() {
            return Err(QueryError::EmptyReducers);
        }
        for (i, reducer) in self.reducers.iter().enumerate() {
            if reducer.output == "ts" {
                return Err(QueryError::ReservedOutput(reducer.output));
            }
            if self.reducers[..i].iter().any(|r| r.output == reducer.output) {
                return Err(QueryError::DuplicateOutput(reducer.output));
            }
            if let ReducerKind::Sum(expr) | ReducerKind::Avg(expr) = reducer.kind
                && expr.divide_by == Some(0.0)
            {
                return Err(QueryError::ZeroDivisor);
            }
        }
        Ok(())
    }
}

/// Invocation-count query grouped by entity reference.
///
/// The store groups records by the reference field, counts occurrences,
/// discards sentinel references (<= 0), sorts descending by count with a
/// deterministic tie order, and truncates to `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceCountQuery {
    pub field: RefField,
    pub limit: usize,
}

/// Which reference field to group by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefField {
    /// The record's direct invocation target
    Contract,
    /// Every element of the record's nested sub-invocation list, unwound to
    /// one counted occurrence per element
    Nested,
}

/// Query construction errors, all programming-contract violations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("query must declare at least one reducer")]
    EmptyReducers,

    #[error("duplicate output field: {0}")]
    DuplicateOutput(&'static str),

    #[error("output field name is reserved: {0}")]
    ReservedOutput(&'static str),

    #[error("zero divisor in field expression")]
    ZeroDivisor,

    #[error("query requires a {expected} group key")]
    KeyMismatch { expected: &'static str },
}
