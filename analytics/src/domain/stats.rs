//! Per-network contract reporting service
//!
//! The surface consumed by the routing layer: general contract stats, merged
//! interaction history, fee history and top-contract rankings. Every
//! operation validates the network name before touching any store.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::config::AnalyticsConfig;
use crate::data::query::{Field, GroupKey, GroupedQuery, Predicate, Reducer, ValueExpr};
use crate::data::traits::{LedgerStore, Source};
use crate::data::types::{
    AggregateStatRecord, FeeAverages, FeeStatRecord, FeeTotals, GeneralStats, RankedContract,
};
use crate::domain::AnalyticsError;
use crate::domain::aggregate::{aggregate, aggregate_total};
use crate::domain::merge::{HistorySource, merge_histories};
use crate::domain::ranking;

/// Output field names, shared between query wiring and display rounding
pub mod fields {
    pub const CONTRACTS_CREATED: &str = "contracts_created";
    pub const AVG_READ_ENTRY: &str = "avg_read_entry";
    pub const AVG_WRITE_ENTRY: &str = "avg_write_entry";
    pub const AVG_LEDGER_READ_BYTE: &str = "avg_ledger_read_byte";
    pub const AVG_LEDGER_WRITE_BYTE: &str = "avg_ledger_write_byte";
    pub const AVG_READ_CODE_BYTE: &str = "avg_read_code_byte";
    pub const AVG_EMIT_EVENT: &str = "avg_emit_event";
    pub const AVG_INVOKE_TIME: &str = "avg_invoke_time";
    pub const TOTAL_UPLOADS: &str = "total_uploads";
    pub const TOTAL_INVOCATIONS: &str = "total_invocations";
    pub const TOTAL_SUBINVOCATIONS: &str = "total_subinvocations";

    pub const WASM: &str = "wasm";
    pub const SAC: &str = "sac";
    pub const PAYMENTS: &str = "payments";
    pub const INVOCATIONS: &str = "invocations";

    pub const AVG_NONREFUNDABLE: &str = "avg_nonrefundable";
    pub const AVG_REFUNDABLE: &str = "avg_refundable";
    pub const AVG_RENT: &str = "avg_rent";
    pub const TOTAL_NONREFUNDABLE: &str = "total_nonrefundable";
    pub const TOTAL_REFUNDABLE: &str = "total_refundable";
    pub const TOTAL_RENT: &str = "total_rent";
}

/// Reporting operations over registered networks
pub struct ContractStatsService {
    config: AnalyticsConfig,
    networks: FxHashMap<String, Arc<dyn LedgerStore>>,
}

impl ContractStatsService {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            networks: FxHashMap::default(),
        }
    }

    /// Attach a store for one logical network
    pub fn register_network(&mut self, name: impl Into<String>, store: Arc<dyn LedgerStore>) {
        self.networks.insert(name.into(), store);
    }

    fn store(&self, network: &str) -> Result<&Arc<dyn LedgerStore>, AnalyticsError> {
        self.networks
            .get(network)
            .ok_or_else(|| AnalyticsError::InvalidNetwork(network.to_string()))
    }

    /// All-time contract roll-up: wasm/sac split, payments, invocations.
    ///
    /// An empty contracts collection yields all zeroes.
    pub async fn general_stats(&self, network: &str) -> Result<GeneralStats, AnalyticsError> {
        let store = self.store(network)?;
        let query = general_stats_query();
        let row = aggregate_total(store.collection(Source::Contracts).as_ref(), &query).await?;
        Ok(match row {
            Some(row) => {
                let value = |name: &str| row.values.get(name).copied().unwrap_or(0.0) as u64;
                GeneralStats {
                    wasm: value(fields::WASM),
                    sac: value(fields::SAC),
                    payments: value(fields::PAYMENTS),
                    invocations: value(fields::INVOCATIONS),
                }
            }
            None => GeneralStats::default(),
        })
    }

    /// Per-day contract creation counts merged with per-day invocation
    /// metrics, ordered ascending by `ts`
    pub async fn interaction_history(
        &self,
        network: &str,
    ) -> Result<Vec<AggregateStatRecord>, AnalyticsError> {
        let store = self.store(network)?;
        merge_histories(
            store.as_ref(),
            vec![
                HistorySource::plain(Source::Contracts, creation_history_query()),
                HistorySource::metrics(Source::Invocations, metrics_history_query()),
            ],
        )
        .await
    }

    /// Per-day average and total fees, split by component
    pub async fn fee_history(&self, network: &str) -> Result<Vec<FeeStatRecord>, AnalyticsError> {
        let store = self.store(network)?;
        let query = fee_history_query();
        let records = aggregate(store.collection(Source::Invocations).as_ref(), &query).await?;
        Ok(records.into_iter().map(into_fee_record).collect())
    }

    /// Contracts ranked by direct invocation count; the limit defaults to
    /// 100 and is clamped to the configured maximum
    pub async fn top_by_invocations(
        &self,
        network: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RankedContract>, AnalyticsError> {
        let store = self.store(network)?;
        ranking::top_by_direct_invocations(store.as_ref(), self.config.ranking_limit(limit)).await
    }

    /// Contracts ranked by sub-invocation count, fixed ranking size
    pub async fn top_by_sub_invocations(
        &self,
        network: &str,
    ) -> Result<Vec<RankedContract>, AnalyticsError> {
        let store = self.store(network)?;
        ranking::top_by_sub_invocations(store.as_ref()).await
    }
}

// ============================================================================
// Query wiring
// ============================================================================

fn general_stats_query() -> GroupedQuery {
    GroupedQuery::new(
        GroupKey::All,
        vec![
            Reducer::count_if(fields::WASM, Predicate::IsSet(Field::Wasm)),
            Reducer::count_if(fields::SAC, Predicate::NotSet(Field::Wasm)),
            Reducer::sum(fields::PAYMENTS, Field::Payments),
            Reducer::sum(fields::INVOCATIONS, Field::Invocations),
        ],
    )
}

fn creation_history_query() -> GroupedQuery {
    GroupedQuery::new(
        GroupKey::DayBucket(Field::Created),
        vec![Reducer::count(fields::CONTRACTS_CREATED)],
    )
}

fn metrics_history_query() -> GroupedQuery {
    GroupedQuery::new(
        GroupKey::DayBucket(Field::Ts),
        vec![
            Reducer::avg(fields::AVG_READ_ENTRY, ValueExpr::field(Field::ReadEntry)),
            Reducer::avg(fields::AVG_WRITE_ENTRY, ValueExpr::field(Field::WriteEntry)),
            Reducer::avg(
                fields::AVG_LEDGER_READ_BYTE,
                ValueExpr::field(Field::LedgerReadByte),
            ),
            Reducer::avg(
                fields::AVG_LEDGER_WRITE_BYTE,
                ValueExpr::field(Field::LedgerWriteByte),
            ),
            Reducer::avg(
                fields::AVG_READ_CODE_BYTE,
                ValueExpr::field(Field::ReadCodeByte),
            ),
            Reducer::avg(fields::AVG_EMIT_EVENT, ValueExpr::field(Field::EmitEvent)),
            // nanoseconds to microseconds; display rounding happens once,
            // after the average
            Reducer::avg(
                fields::AVG_INVOKE_TIME,
                ValueExpr::scaled(Field::InvokeTimeNsecs, 1000.0),
            ),
            Reducer::count_if(
                fields::TOTAL_UPLOADS,
                Predicate::NonZero(Field::WriteCodeByte),
            ),
            Reducer::count(fields::TOTAL_INVOCATIONS),
            Reducer::sum(fields::TOTAL_SUBINVOCATIONS, Field::Calls),
        ],
    )
}

fn fee_history_query() -> GroupedQuery {
    GroupedQuery::new(
        GroupKey::DayBucket(Field::Ts),
        vec![
            Reducer::avg(
                fields::AVG_NONREFUNDABLE,
                ValueExpr::field(Field::FeeNonrefundable),
            ),
            Reducer::avg(fields::AVG_REFUNDABLE, ValueExpr::field(Field::FeeRefundable)),
            Reducer::avg(fields::AVG_RENT, ValueExpr::field(Field::FeeRent)),
            Reducer::sum(
                fields::TOTAL_NONREFUNDABLE,
                Field::FeeNonrefundable,
            ),
            Reducer::sum(fields::TOTAL_REFUNDABLE, Field::FeeRefundable),
            Reducer::sum(fields::TOTAL_RENT, Field::FeeRent),
        ],
    )
}

fn into_fee_record(record: AggregateStatRecord) -> FeeStatRecord {
    FeeStatRecord {
        ts: record.ts,
        avg_fees: FeeAverages {
            nonrefundable: record.get(fields::AVG_NONREFUNDABLE),
            refundable: record.get(fields::AVG_REFUNDABLE),
            rent: record.get(fields::AVG_RENT),
        },
        total_fees: FeeTotals {
            nonrefundable: record.get(fields::TOTAL_NONREFUNDABLE).unwrap_or(0.0),
            refundable: record.get(fields::TOTAL_REFUNDABLE).unwrap_or(0.0),
            rent: record.get(fields::TOTAL_RENT).unwrap_or(0.0),
        },
    }
}
