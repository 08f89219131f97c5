//! Human-readable rendering of epoch timestamps.

use chrono::{DateTime, Utc};

/// Shown when a timestamp is missing or zero.
pub const NOT_AVAILABLE: &str = "Not available";

/// Rendering pattern, always in UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render epoch seconds as `YYYY-MM-DD HH:MM:SS` (UTC).
///
/// `None` and `0` yield [`NOT_AVAILABLE`]; values outside chrono's range are
/// returned as their decimal form.
pub fn format_timestamp(ts: Option<i64>) -> String {
    match ts {
        None | Some(0) => NOT_AVAILABLE.to_string(),
        Some(secs) => match DateTime::<Utc>::from_timestamp(secs, 0) {
            Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
            None => secs.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_zero_are_not_available() {
        assert_eq!(format_timestamp(None), NOT_AVAILABLE);
        assert_eq!(format_timestamp(Some(0)), NOT_AVAILABLE);
        assert_eq!(format_timestamp(None), format_timestamp(Some(0)));
    }

    #[test]
    fn known_epoch() {
        assert_eq!(format_timestamp(Some(1_700_000_000)), "2023-11-14 22:13:20");
        assert_eq!(format_timestamp(Some(1)), "1970-01-01 00:00:01");
    }

    #[test]
    fn negative_epoch_before_1970() {
        assert_eq!(format_timestamp(Some(-86_400)), "1969-12-31 00:00:00");
    }

    #[test]
    fn out_of_range_falls_back_to_literal() {
        assert_eq!(format_timestamp(Some(i64::MAX)), i64::MAX.to_string());
        assert_eq!(format_timestamp(Some(i64::MIN)), i64::MIN.to_string());
    }
}
