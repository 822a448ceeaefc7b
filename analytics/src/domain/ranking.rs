//! Top-contract rankings
//!
//! Counts invocations per entity reference on the store, then resolves every
//! surviving reference through one batched directory lookup for the whole
//! ranking. Sentinel references never reach the output; the store drops them
//! before sorting.

use crate::core::constants::DEFAULT_TOP_LIMIT;
use crate::data::query::{RefField, ReferenceCountQuery};
use crate::data::traits::{LedgerStore, Source};
use crate::data::types::RankedContract;
use crate::domain::AnalyticsError;
use crate::domain::resolver::AddressResolver;

/// Contracts ranked by direct invocation count, descending
pub async fn top_by_direct_invocations(
    store: &dyn LedgerStore,
    limit: usize,
) -> Result<Vec<RankedContract>, AnalyticsError> {
    ranked(
        store,
        ReferenceCountQuery {
            field: RefField::Contract,
            limit,
        },
    )
    .await
}

/// Contracts ranked by how often they were invoked transitively; every
/// nested reference counts as one occurrence. Ranking size is fixed.
pub async fn top_by_sub_invocations(
    store: &dyn LedgerStore,
) -> Result<Vec<RankedContract>, AnalyticsError> {
    ranked(
        store,
        ReferenceCountQuery {
            field: RefField::Nested,
            limit: DEFAULT_TOP_LIMIT,
        },
    )
    .await
}

async fn ranked(
    store: &dyn LedgerStore,
    query: ReferenceCountQuery,
) -> Result<Vec<RankedContract>, AnalyticsError> {
    let counts = store
        .collection(Source::Invocations)
        .count_by_reference(&query)
        .await?;

    let mut resolver = AddressResolver::new(store.directory());
    for entry in &counts {
        resolver.request(entry.reference);
    }
    resolver.fetch_all().await?;

    counts
        .into_iter()
        .map(|entry| {
            Ok(RankedContract {
                contract: resolver.resolve(entry.reference)?.map(str::to_owned),
                invocations: entry.invocations,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{MemoryDirectory, MemoryLedgerStore};
    use crate::data::types::RawInvocationRecord;

    fn invocation(contract: i64, nested: Vec<i64>) -> RawInvocationRecord {
        RawInvocationRecord {
            contract,
            nested,
            ..Default::default()
        }
    }

    fn store(invocations: Vec<RawInvocationRecord>) -> MemoryLedgerStore {
        MemoryLedgerStore::new(
            vec![],
            invocations,
            MemoryDirectory::new([
                (5, "CCONTRACT5".to_string()),
                (7, "CCONTRACT7".to_string()),
            ]),
        )
    }

    #[tokio::test]
    async fn test_top_by_direct_invocations() {
        let store = store(vec![
            invocation(-1, vec![]),
            invocation(0, vec![]),
            invocation(5, vec![]),
            invocation(5, vec![]),
            invocation(5, vec![]),
            invocation(7, vec![]),
        ]);
        let ranked = top_by_direct_invocations(&store, 10).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].contract.as_deref(), Some("CCONTRACT5"));
        assert_eq!(ranked[0].invocations, 3);
        assert_eq!(ranked[1].contract.as_deref(), Some("CCONTRACT7"));
        assert_eq!(ranked[1].invocations, 1);
    }

    #[tokio::test]
    async fn test_one_batch_for_whole_ranking() {
        let store = store(vec![
            invocation(5, vec![]),
            invocation(5, vec![]),
            invocation(7, vec![]),
        ]);
        let directory = store.directory_handle();
        top_by_direct_invocations(&store, 10).await.unwrap();
        assert_eq!(directory.batch_calls(), 1);
    }

    #[tokio::test]
    async fn test_top_by_sub_invocations_unwinds_nested() {
        let store = store(vec![
            invocation(1, vec![5, 5, 7]),
            invocation(2, vec![7]),
        ]);
        let ranked = top_by_sub_invocations(&store).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].invocations, 2);
        assert_eq!(ranked[1].invocations, 2);
    }

    #[tokio::test]
    async fn test_unresolvable_reference_ranked_without_address() {
        let store = store(vec![invocation(9, vec![]), invocation(9, vec![])]);
        let ranked = top_by_direct_invocations(&store, 10).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].contract, None);
        assert_eq!(ranked[0].invocations, 2);
    }
}
