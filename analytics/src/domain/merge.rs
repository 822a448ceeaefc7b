//! Multi-source history merge
//!
//! Fan-out/fan-in: every source runs its own bucketed aggregation
//! concurrently (the sources read disjoint data, so there is no ordering
//! dependency), then the per-day outputs are merged into one ordered
//! sequence keyed by timestamp. If any sub-query fails the whole request
//! fails; a partial merge is never returned.

use std::collections::hash_map::Entry;

use futures::future::try_join_all;
use rustc_hash::FxHashMap;

use crate::data::query::GroupedQuery;
use crate::data::traits::{LedgerStore, Source};
use crate::data::types::AggregateStatRecord;
use crate::domain::AnalyticsError;
use crate::domain::aggregate::aggregate;
use crate::domain::normalize::normalize_invocation_metrics;
use crate::utils::time::{bucket_datetime, day_bucket};

/// One aggregation feeding the merged history
pub struct HistorySource {
    pub source: Source,
    pub query: GroupedQuery,
    normalize: bool,
}

impl HistorySource {
    /// Source whose output is emitted as-is
    pub fn plain(source: Source, query: GroupedQuery) -> Self {
        Self {
            source,
            query,
            normalize: false,
        }
    }

    /// Source whose output passes through invocation-metric display rounding
    pub fn metrics(source: Source, query: GroupedQuery) -> Self {
        Self {
            source,
            query,
            normalize: true,
        }
    }
}

/// Run every source concurrently and merge their per-day records
pub async fn merge_histories(
    store: &dyn LedgerStore,
    sources: Vec<HistorySource>,
) -> Result<Vec<AggregateStatRecord>, AnalyticsError> {
    let tasks = sources.into_iter().map(|src| {
        let collection = store.collection(src.source);
        async move {
            let mut records = aggregate(collection.as_ref(), &src.query).await?;
            if src.normalize {
                for record in &mut records {
                    normalize_invocation_metrics(record);
                }
            }
            Ok::<_, AnalyticsError>(records)
        }
    });
    let results = try_join_all(tasks).await?;

    let merged = merge_records(results);
    if let (Some(first), Some(last)) = (merged.first(), merged.last()) {
        tracing::debug!(
            from = %bucket_datetime(day_bucket(first.ts)),
            to = %bucket_datetime(day_bucket(last.ts)),
            days = merged.len(),
            "merged history",
        );
    }
    Ok(merged)
}

/// Single-pass merge of independently aggregated result sets.
///
/// Records sharing a `ts` are combined into one record holding the union of
/// their fields; sources produce disjoint field sets by contract, so an
/// overlapping name (a configuration error) is last-write-wins. The final
/// sort is mandatory: sub-queries complete in any order and map iteration
/// order is not numeric.
pub fn merge_records(results: Vec<Vec<AggregateStatRecord>>) -> Vec<AggregateStatRecord> {
    let mut merged: FxHashMap<i64, AggregateStatRecord> = FxHashMap::default();
    for records in results {
        for record in records {
            match merged.entry(record.ts) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    slot.get_mut().fields.extend(record.fields);
                }
            }
        }
    }
    let mut out: Vec<AggregateStatRecord> = merged.into_values().collect();
    out.sort_by_key(|record| record.ts);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: i64, fields: &[(&'static str, f64)]) -> AggregateStatRecord {
        let mut rec = AggregateStatRecord::new(ts);
        for &(name, value) in fields {
            rec.set(name, value);
        }
        rec
    }

    #[test]
    fn test_merge_unions_disjoint_fields() {
        let a = vec![record(86_400, &[("contracts_created", 2.0)])];
        let b = vec![record(86_400, &[("total_invocations", 9.0)])];
        let merged = merge_records(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].get("contracts_created"), Some(2.0));
        assert_eq!(merged[0].get("total_invocations"), Some(9.0));
    }

    #[test]
    fn test_merge_is_order_independent_for_disjoint_fields() {
        let a = vec![
            record(0, &[("contracts_created", 1.0)]),
            record(86_400, &[("contracts_created", 4.0)]),
        ];
        let b = vec![record(86_400, &[("total_invocations", 7.0)])];
        let ab = merge_records(vec![a.clone(), b.clone()]);
        let ba = merge_records(vec![b, a]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_merge_output_sorted_unique_ts() {
        let a = vec![
            record(5 * 86_400, &[("x", 1.0)]),
            record(86_400, &[("x", 2.0)]),
        ];
        let b = vec![
            record(3 * 86_400, &[("y", 3.0)]),
            record(86_400, &[("y", 4.0)]),
        ];
        let merged = merge_records(vec![a, b]);
        let ts: Vec<i64> = merged.iter().map(|r| r.ts).collect();
        assert_eq!(ts, vec![86_400, 3 * 86_400, 5 * 86_400]);
    }

    // Overlapping field names from two sources are a configuration error;
    // the merge keeps one of the two values (last write wins), it never
    // drops the record. Which value survives is deliberately unasserted.
    #[test]
    fn test_merge_overlapping_field_keeps_a_value() {
        let a = vec![record(0, &[("n", 1.0)])];
        let b = vec![record(0, &[("n", 2.0)])];
        let merged = merge_records(vec![a, b]);
        assert_eq!(merged.len(), 1);
        let value = merged[0].get("n").unwrap();
        assert!(value == 1.0 || value == 2.0);
    }

    #[test]
    fn test_merge_empty_sources() {
        assert!(merge_records(vec![]).is_empty());
        assert!(merge_records(vec![vec![], vec![]]).is_empty());
    }
}
