//! Display rounding for invocation metrics
//!
//! Pure transforms, no I/O. Raw averages are rounded to fixed per-field
//! precisions for the charts; the nanosecond-to-microsecond rescale already
//! happened in the query expression, so rounding here is the single point
//! where precision is applied.

use crate::data::types::AggregateStatRecord;
use crate::domain::stats::fields;

/// Decimal places per output field: entry counts 1, byte counters 0,
/// emitted events 2, invocation time (microseconds) 1
const METRIC_PRECISION: &[(&str, u32)] = &[
    (fields::AVG_READ_ENTRY, 1),
    (fields::AVG_WRITE_ENTRY, 1),
    (fields::AVG_LEDGER_READ_BYTE, 0),
    (fields::AVG_LEDGER_WRITE_BYTE, 0),
    (fields::AVG_READ_CODE_BYTE, 0),
    (fields::AVG_EMIT_EVENT, 2),
    (fields::AVG_INVOKE_TIME, 1),
];

/// Round half away from zero at a fixed number of decimals
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let pow = 10f64.powi(decimals as i32);
    (value * pow).round() / pow
}

/// Round every metric average of one summary row to its display precision.
///
/// Absent fields stay absent: an undefined average is never turned into 0.
pub fn normalize_invocation_metrics(record: &mut AggregateStatRecord) {
    for &(name, decimals) in METRIC_PRECISION {
        if let Some(value) = record.fields.get_mut(name) {
            *value = round_to(*value, decimals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_half_away_from_zero() {
        assert_eq!(round_to(1.25, 1), 1.3);
        assert_eq!(round_to(-1.25, 1), -1.3);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(1.234, 2), 1.23);
    }

    #[test]
    fn test_round_to_is_idempotent() {
        for value in [1.25, -7.777, 0.049, 123.456] {
            for decimals in 0..3 {
                let once = round_to(value, decimals);
                assert_eq!(round_to(once, decimals), once);
            }
        }
    }

    #[test]
    fn test_normalize_applies_per_field_precision() {
        let mut record = AggregateStatRecord::new(0);
        record.set(fields::AVG_READ_ENTRY, 3.14159);
        record.set(fields::AVG_LEDGER_READ_BYTE, 1024.7);
        record.set(fields::AVG_EMIT_EVENT, 0.125);
        record.set(fields::AVG_INVOKE_TIME, 250.97);
        record.set(fields::TOTAL_INVOCATIONS, 12.0);
        normalize_invocation_metrics(&mut record);
        assert_eq!(record.get(fields::AVG_READ_ENTRY), Some(3.1));
        assert_eq!(record.get(fields::AVG_LEDGER_READ_BYTE), Some(1025.0));
        assert_eq!(record.get(fields::AVG_EMIT_EVENT), Some(0.13));
        assert_eq!(record.get(fields::AVG_INVOKE_TIME), Some(251.0));
        // untouched: not a display-rounded metric
        assert_eq!(record.get(fields::TOTAL_INVOCATIONS), Some(12.0));
    }

    #[test]
    fn test_normalize_leaves_absent_fields_absent() {
        let mut record = AggregateStatRecord::new(0);
        normalize_invocation_metrics(&mut record);
        assert_eq!(record.get(fields::AVG_INVOKE_TIME), None);
    }
}
