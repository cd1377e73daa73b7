use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Returns UNIX timestamp (microseconds), the precision time stamp unit
pub fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_micros(0))
        .as_micros() as u64
}

/// Returns UNIX timestamp (milliseconds)
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_millis(0))
        .as_millis() as u64
}
