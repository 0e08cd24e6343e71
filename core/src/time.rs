use chrono::{DateTime, Duration, Utc};

/// Absolute UTC timestamp used across traces, events and windows.
pub type Timestamp = DateTime<Utc>;

/// Shift a timestamp by a (possibly fractional, possibly negative) number of seconds.
pub fn add_seconds(time: Timestamp, seconds: f64) -> Timestamp {
    time + Duration::nanoseconds((seconds * 1e9).round() as i64)
}

/// Signed difference `later - earlier` in seconds.
pub fn seconds_between(later: Timestamp, earlier: Timestamp) -> f64 {
    let delta = later - earlier;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        // beyond ~292 years the nanosecond count overflows
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
