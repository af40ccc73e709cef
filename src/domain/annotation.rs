// "Current time" marker positions
//
// Backend timestamps are local wall-clock time encoded as if it were UTC, so
// markers derived from the local clock use the same encoding.
use chrono::{DateTime, Local, Timelike};

const QUARTER_MS: i64 = 15 * 60 * 1000;

pub fn wall_clock_millis(now: DateTime<Local>) -> i64 {
    now.naive_local().and_utc().timestamp_millis()
}

pub fn current_hour_millis(now: DateTime<Local>) -> i64 {
    let naive = now.naive_local();
    let hour = naive
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(naive);
    hour.and_utc().timestamp_millis()
}

/// Epoch millis corrected by the server-reported clock skew
pub fn skewed_millis(now: DateTime<Local>, time_delta: i64) -> i64 {
    now.timestamp_millis() - time_delta
}

pub fn floor_to_quarter(millis: i64) -> i64 {
    millis.div_euclid(QUARTER_MS) * QUARTER_MS
}
