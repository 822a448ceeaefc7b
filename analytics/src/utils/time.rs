//! Day bucket math

use chrono::{DateTime, Utc};

use crate::core::constants::DAY;

/// Bucket index for a unix-seconds timestamp: `floor(ts / 86400)`
pub fn day_bucket(ts: i64) -> i64 {
    ts.div_euclid(DAY)
}

/// Timestamp of a bucket's start, unix seconds
pub fn bucket_ts(bucket: i64) -> i64 {
    bucket * DAY
}

/// Bucket start as a `DateTime` for logs and diagnostics
pub fn bucket_datetime(bucket: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(bucket_ts(bucket), 0).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_day_bucket_floors() {
        assert_eq!(day_bucket(0), 0);
        assert_eq!(day_bucket(86_399), 0);
        assert_eq!(day_bucket(86_400), 1);
        assert_eq!(day_bucket(2 * 86_400 + 1), 2);
    }

    #[test]
    fn test_bucket_ts_is_day_multiple() {
        for bucket in [0, 1, 19_723] {
            assert_eq!(bucket_ts(bucket) % 86_400, 0);
            assert_eq!(day_bucket(bucket_ts(bucket)), bucket);
        }
    }

    #[test]
    fn test_bucket_datetime_known_value() {
        // 2024-01-01 00:00:00 UTC = 1704067200 seconds = bucket 19723
        let dt = bucket_datetime(19_723);
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
    }
}
