use chrono::{DateTime, Utc};

use crate::core::Timestamp;
use crate::error::{TimelineError, TimelineResult};

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;
/// Nominal month used by the step ladder; calendar iteration is exact.
pub const MILLIS_PER_MONTH: i64 = 30 * MILLIS_PER_DAY;
/// Nominal year (twelve nominal months) used by the step ladder.
pub const MILLIS_PER_YEAR: i64 = 12 * MILLIS_PER_MONTH;

#[must_use]
pub fn datetime_to_millis(time: Timestamp) -> i64 {
    time.timestamp_millis()
}

pub fn millis_to_datetime(millis: i64) -> TimelineResult<Timestamp> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or(TimelineError::InvalidRange {
        start: millis as f64,
        end: millis as f64,
    })
}

/// Converts a fractional millisecond value, rounding to the nearest millisecond.
pub fn millis_f64_to_datetime(millis: f64) -> TimelineResult<Timestamp> {
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(TimelineError::InvalidRange {
            start: millis,
            end: millis,
        });
    }
    millis_to_datetime(millis.round() as i64)
}
