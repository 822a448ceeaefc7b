//! In-memory store backend
//!
//! Reference implementation of the collaborator traits: a real deployment
//! pushes grouped reduction down to its database, but the semantics a backend
//! must honor are the ones implemented here. Also serves as the fixture for
//! pipeline tests.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::data::error::StoreError;
use crate::data::query::{
    Field, GroupKey, GroupedQuery, Predicate, ReducerKind, RefField, ReferenceCountQuery,
};
use crate::data::traits::{AddressDirectory, Collection, LedgerStore, Source};
use crate::data::types::{
    GroupedRow, RawContractRecord, RawInvocationRecord, ReferenceCount,
};
use crate::utils::time::day_bucket;

/// Field access for records held in memory
pub trait RecordFields: Send + Sync {
    /// Numeric value of a source field, if the record carries it
    fn value(&self, field: Field) -> Option<f64>;

    /// Direct invocation target, for reference grouping
    fn direct_reference(&self) -> Option<i64> {
        None
    }

    /// Transitively invoked references, one occurrence per element
    fn nested_references(&self) -> &[i64] {
        &[]
    }
}

impl RecordFields for RawContractRecord {
    fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Created => Some(self.created as f64),
            Field::Wasm => self.wasm.then_some(1.0),
            Field::Payments => Some(self.payments as f64),
            Field::Invocations => Some(self.invocations as f64),
            _ => None,
        }
    }
}

impl RecordFields for RawInvocationRecord {
    fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Ts => Some(self.ts as f64),
            Field::Calls => Some(self.calls as f64),
            Field::ReadEntry => self.metrics.read_entry,
            Field::WriteEntry => self.metrics.write_entry,
            Field::LedgerReadByte => self.metrics.ledger_read_byte,
            Field::LedgerWriteByte => self.metrics.ledger_write_byte,
            Field::ReadCodeByte => self.metrics.read_code_byte,
            Field::EmitEvent => self.metrics.emit_event,
            Field::InvokeTimeNsecs => self.metrics.invoke_time_nsecs,
            Field::WriteCodeByte => self.metrics.write_code_byte,
            Field::FeeNonrefundable => self.metrics.fee.nonrefundable,
            Field::FeeRefundable => self.metrics.fee.refundable,
            Field::FeeRent => self.metrics.fee.rent,
            _ => None,
        }
    }

    fn direct_reference(&self) -> Option<i64> {
        Some(self.contract)
    }

    fn nested_references(&self) -> &[i64] {
        &self.nested
    }
}

// ============================================================================
// Reducer accumulators
// ============================================================================

/// Per-group accumulator state, one per reducer, folded in a single pass
enum Accumulator {
    Count(u64),
    Sum(f64),
    Avg { sum: f64, count: u64 },
    CountIf(u64),
}

impl Accumulator {
    fn new(kind: &ReducerKind) -> Self {
        match kind {
            ReducerKind::Count => Self::Count(0),
            ReducerKind::Sum(_) => Self::Sum(0.0),
            ReducerKind::Avg(_) => Self::Avg { sum: 0.0, count: 0 },
            ReducerKind::CountIf(_) => Self::CountIf(0),
        }
    }

    fn fold(&mut self, kind: &ReducerKind, record: &dyn RecordFields) {
        match (self, kind) {
            (Self::Count(n), ReducerKind::Count) => *n += 1,
            (Self::Sum(total), ReducerKind::Sum(expr)) => {
                if let Some(value) = eval(record, expr.field, expr.divide_by) {
                    *total += value;
                }
            }
            (Self::Avg { sum, count }, ReducerKind::Avg(expr)) => {
                if let Some(value) = eval(record, expr.field, expr.divide_by) {
                    *sum += value;
                    *count += 1;
                }
            }
            (Self::CountIf(n), ReducerKind::CountIf(predicate)) => {
                if matches(record, predicate) {
                    *n += 1;
                }
            }
            _ => unreachable!("accumulator kind mismatch"),
        }
    }

    /// Final value; `None` for an average over no inputs
    fn finish(&self) -> Option<f64> {
        match self {
            Self::Count(n) | Self::CountIf(n) => Some(*n as f64),
            Self::Sum(total) => Some(*total),
            Self::Avg { count: 0, .. } => None,
            Self::Avg { sum, count } => Some(sum / *count as f64),
        }
    }
}

fn eval(record: &dyn RecordFields, field: Field, divide_by: Option<f64>) -> Option<f64> {
    let value = record.value(field)?;
    Some(match divide_by {
        Some(divisor) => value / divisor,
        None => value,
    })
}

fn matches(record: &dyn RecordFields, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::IsSet(field) => record.value(*field).is_some(),
        Predicate::NotSet(field) => record.value(*field).is_none(),
        Predicate::NonZero(field) => record.value(*field).is_some_and(|v| v != 0.0),
    }
}

// ============================================================================
// Collection
// ============================================================================

/// A record collection held in memory
pub struct MemoryCollection<R> {
    records: Vec<R>,
}

impl<R: RecordFields> MemoryCollection<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    fn execute_grouped(&self, query: &GroupedQuery) -> Vec<GroupedRow> {
        // BTreeMap keeps group iteration deterministic
        let mut groups: std::collections::BTreeMap<i64, Vec<Accumulator>> = Default::default();
        for record in &self.records {
            let key = match query.key {
                GroupKey::All => 0,
                GroupKey::DayBucket(field) => match record.value(field) {
                    Some(value) => day_bucket(value as i64),
                    None => {
                        // Data-quality signal: an indexed record without its
                        // bucket key cannot be attributed to any day
                        tracing::warn!(?field, "record missing bucket field, skipped");
                        continue;
                    }
                },
            };
            let accumulators = groups.entry(key).or_insert_with(|| {
                query
                    .reducers
                    .iter()
                    .map(|r| Accumulator::new(&r.kind))
                    .collect()
            });
            for (accumulator, reducer) in accumulators.iter_mut().zip(&query.reducers) {
                accumulator.fold(&reducer.kind, record);
            }
        }

        groups
            .into_iter()
            .map(|(key, accumulators)| {
                let values = query
                    .reducers
                    .iter()
                    .zip(&accumulators)
                    .filter_map(|(reducer, acc)| acc.finish().map(|v| (reducer.output, v)))
                    .collect();
                GroupedRow { key, values }
            })
            .collect()
    }

    fn execute_reference_counts(&self, query: &ReferenceCountQuery) -> Vec<ReferenceCount> {
        let mut counts: FxHashMap<i64, u64> = FxHashMap::default();
        for record in &self.records {
            match query.field {
                RefField::Contract => {
                    if let Some(reference) = record.direct_reference() {
                        *counts.entry(reference).or_default() += 1;
                    }
                }
                RefField::Nested => {
                    for &reference in record.nested_references() {
                        *counts.entry(reference).or_default() += 1;
                    }
                }
            }
        }

        let mut ranked: Vec<ReferenceCount> = counts
            .into_iter()
            .filter(|&(reference, _)| reference > 0)
            .map(|(reference, invocations)| ReferenceCount {
                reference,
                invocations,
            })
            .collect();
        // Descending by count; ascending reference id keeps ties deterministic
        ranked.sort_by(|a, b| {
            b.invocations
                .cmp(&a.invocations)
                .then(a.reference.cmp(&b.reference))
        });
        ranked.truncate(query.limit);
        ranked
    }
}

#[async_trait]
impl<R: RecordFields> Collection for MemoryCollection<R> {
    async fn grouped(&self, query: &GroupedQuery) -> Result<Vec<GroupedRow>, StoreError> {
        Ok(self.execute_grouped(query))
    }

    async fn count_by_reference(
        &self,
        query: &ReferenceCountQuery,
    ) -> Result<Vec<ReferenceCount>, StoreError> {
        Ok(self.execute_reference_counts(query))
    }
}

// ============================================================================
// Directory and store
// ============================================================================

/// In-memory address directory with a batch-call counter
pub struct MemoryDirectory {
    addresses: FxHashMap<i64, String>,
    batch_calls: AtomicUsize,
}

impl MemoryDirectory {
    pub fn new(addresses: impl IntoIterator<Item = (i64, String)>) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
            batch_calls: AtomicUsize::new(0),
        }
    }

    /// Number of batch lookups performed so far
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AddressDirectory for MemoryDirectory {
    async fn resolve_batch(
        &self,
        ids: &BTreeSet<i64>,
    ) -> Result<FxHashMap<i64, String>, StoreError> {
        self.batch_calls.fetch_add(1, Ordering::Relaxed);
        Ok(ids
            .iter()
            .filter_map(|id| self.addresses.get(id).map(|addr| (*id, addr.clone())))
            .collect())
    }
}

/// In-memory store for one logical network
pub struct MemoryLedgerStore {
    contracts: Arc<MemoryCollection<RawContractRecord>>,
    invocations: Arc<MemoryCollection<RawInvocationRecord>>,
    directory: Arc<MemoryDirectory>,
}

impl MemoryLedgerStore {
    pub fn new(
        contracts: Vec<RawContractRecord>,
        invocations: Vec<RawInvocationRecord>,
        directory: MemoryDirectory,
    ) -> Self {
        Self {
            contracts: Arc::new(MemoryCollection::new(contracts)),
            invocations: Arc::new(MemoryCollection::new(invocations)),
            directory: Arc::new(directory),
        }
    }

    /// Shared handle to the directory, for inspecting batch-call counts
    pub fn directory_handle(&self) -> Arc<MemoryDirectory> {
        Arc::clone(&self.directory)
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn collection(&self, source: Source) -> Arc<dyn Collection> {
        match source {
            Source::Contracts => Arc::clone(&self.contracts) as Arc<dyn Collection>,
            Source::Invocations => Arc::clone(&self.invocations) as Arc<dyn Collection>,
        }
    }

    fn directory(&self) -> Arc<dyn AddressDirectory> {
        Arc::clone(&self.directory) as Arc<dyn AddressDirectory>
    }
}
