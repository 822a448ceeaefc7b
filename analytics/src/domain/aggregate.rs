//! Bucketed aggregation
//!
//! Thin layer between the pipeline and a record collection: validates the
//! typed query, dispatches it, converts group keys back to timestamps and
//! enforces the output contract (ascending, one record per day).

use crate::data::error::StoreError;
use crate::data::query::{GroupKey, GroupedQuery, QueryError};
use crate::data::traits::Collection;
use crate::data::types::{AggregateStatRecord, GroupedRow};
use crate::domain::AnalyticsError;
use crate::utils::time::bucket_ts;

/// Run a day-bucketed query and emit one summary row per day, ordered
/// ascending by `ts`
pub async fn aggregate(
    collection: &dyn Collection,
    query: &GroupedQuery,
) -> Result<Vec<AggregateStatRecord>, AnalyticsError> {
    if !matches!(query.key, GroupKey::DayBucket(_)) {
        return Err(QueryError::KeyMismatch {
            expected: "day-bucket",
        }
        .into());
    }
    query.validate()?;

    let rows = collection.grouped(query).await?;
    let mut records: Vec<AggregateStatRecord> = rows
        .into_iter()
        .map(|row| AggregateStatRecord {
            ts: bucket_ts(row.key),
            fields: row.values,
        })
        .collect();
    records.sort_by_key(|record| record.ts);

    if records.windows(2).any(|pair| pair[0].ts == pair[1].ts) {
        return Err(duplicate_group_error());
    }
    tracing::debug!(days = records.len(), "bucketed aggregation complete");
    Ok(records)
}

/// Run an all-records roll-up and return its single row, or `None` for an
/// empty collection
pub async fn aggregate_total(
    collection: &dyn Collection,
    query: &GroupedQuery,
) -> Result<Option<GroupedRow>, AnalyticsError> {
    if query.key != GroupKey::All {
        return Err(QueryError::KeyMismatch {
            expected: "all-records",
        }
        .into());
    }
    query.validate()?;

    let mut rows = collection.grouped(query).await?;
    if rows.len() > 1 {
        return Err(duplicate_group_error());
    }
    Ok(rows.pop())
}

/// A backend emitting two rows for one group key violates its contract
fn duplicate_group_error() -> AnalyticsError {
    StoreError::backend("backend emitted duplicate rows for one group key").into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryCollection;
    use crate::data::query::{Field, Reducer};
    use crate::data::types::RawContractRecord;

    fn contract(created: i64) -> RawContractRecord {
        RawContractRecord {
            created,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_aggregate_emits_day_multiples_ascending() {
        let collection = MemoryCollection::new(vec![
            contract(3 * 86_400 + 17),
            contract(5),
            contract(3 * 86_400),
        ]);
        let query = GroupedQuery::new(
            GroupKey::DayBucket(Field::Created),
            vec![Reducer::count("contracts_created")],
        );
        let records = aggregate(&collection, &query).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ts, 0);
        assert_eq!(records[0].get("contracts_created"), Some(1.0));
        assert_eq!(records[1].ts, 3 * 86_400);
        assert_eq!(records[1].get("contracts_created"), Some(2.0));
        assert!(records.iter().all(|r| r.ts % 86_400 == 0));
    }

    #[tokio::test]
    async fn test_aggregate_rejects_all_records_key() {
        let collection = MemoryCollection::new(vec![contract(0)]);
        let query = GroupedQuery::new(GroupKey::All, vec![Reducer::count("n")]);
        let err = aggregate(&collection, &query).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_aggregate_total_empty_collection() {
        let collection = MemoryCollection::new(Vec::<RawContractRecord>::new());
        let query = GroupedQuery::new(GroupKey::All, vec![Reducer::count("n")]);
        let row = aggregate_total(&collection, &query).await.unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_aggregate_total_rejects_bucketed_key() {
        let collection = MemoryCollection::new(vec![contract(0)]);
        let query = GroupedQuery::new(
            GroupKey::DayBucket(Field::Created),
            vec![Reducer::count("n")],
        );
        let err = aggregate_total(&collection, &query).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_aggregate_validates_before_dispatch() {
        let collection = MemoryCollection::new(vec![contract(0)]);
        let query = GroupedQuery::new(GroupKey::DayBucket(Field::Created), vec![]);
        let err = aggregate(&collection, &query).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidQuery(_)));
    }
}
