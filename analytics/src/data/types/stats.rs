//! Aggregate result types

use std::collections::BTreeMap;

use serde::Serialize;

/// One per-day summary row emitted to callers.
///
/// `ts` is always a multiple of 86400; `fields` maps reducer output names to
/// values. An absent field means the value is undefined for that day (an
/// average over no inputs), which is not the same as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStatRecord {
    pub ts: i64,
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, f64>,
}

impl AggregateStatRecord {
    pub fn new(ts: i64) -> Self {
        Self {
            ts,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    pub fn set(&mut self, name: &'static str, value: f64) {
        self.fields.insert(name, value);
    }
}

/// Raw output of a grouped-reduction query, before group keys are converted
/// back to timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow {
    /// Group key: the day bucket index, or 0 for an all-records roll-up
    pub key: i64,
    pub values: BTreeMap<&'static str, f64>,
}

/// Invocation count for one entity reference, before address resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceCount {
    pub reference: i64,
    pub invocations: u64,
}

/// One ranking entry; the numeric reference has been replaced by its
/// canonical address, `None` when the directory could not resolve it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedContract {
    pub contract: Option<String>,
    pub invocations: u64,
}

/// All-time contract roll-up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeneralStats {
    /// Contracts backed by uploaded Wasm
    pub wasm: u64,
    /// Stellar asset contract wrappers
    pub sac: u64,
    pub payments: u64,
    pub invocations: u64,
}

/// Per-day fee statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeStatRecord {
    pub ts: i64,
    #[serde(rename = "avgFees")]
    pub avg_fees: FeeAverages,
    #[serde(rename = "totalFees")]
    pub total_fees: FeeTotals,
}

/// Mean fee per component; absent when no invocation that day carried the
/// component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeeAverages {
    pub nonrefundable: Option<f64>,
    pub refundable: Option<f64>,
    pub rent: Option<f64>,
}

/// Summed fee per component; zero when no invocation carried the component
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeeTotals {
    pub nonrefundable: f64,
    pub refundable: f64,
    pub rent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_record_serializes_flat() {
        let mut record = AggregateStatRecord::new(86_400);
        record.set("contracts_created", 3.0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["ts"], 86_400);
        assert_eq!(json["contracts_created"], 3.0);
    }

    #[test]
    fn test_absent_field_stays_absent_in_json() {
        let record = AggregateStatRecord::new(0);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("avg_invoke_time").is_none());
    }

    #[test]
    fn test_fee_record_json_keys() {
        let record = FeeStatRecord {
            ts: 86_400,
            avg_fees: FeeAverages {
                nonrefundable: Some(120.5),
                refundable: None,
                rent: Some(3.0),
            },
            total_fees: FeeTotals {
                nonrefundable: 241.0,
                refundable: 0.0,
                rent: 6.0,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["avgFees"]["nonrefundable"], 120.5);
        assert!(json["avgFees"]["refundable"].is_null());
        assert_eq!(json["totalFees"]["rent"], 6.0);
    }
}
