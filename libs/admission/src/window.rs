//! Fixed rate windows and their counter keys

use chrono::{DateTime, Utc};
use std::fmt;

/// What a counter limits: all traffic, or one party's traffic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RateScope {
    Global,
    Party(String),
}

impl fmt::Display for RateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateScope::Global => f.write_str("global"),
            RateScope::Party(id) => write!(f, "party:{}", id),
        }
    }
}

/// Snapshot of one scope's counter in the current window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateWindow {
    pub scope: RateScope,
    pub window_seconds: u64,
    pub capacity: u64,
    pub count: u64,
    pub window_key: i64,
}

impl RateWindow {
    pub fn remaining(&self) -> u64 {
        self.capacity.saturating_sub(self.count)
    }

    pub fn is_saturated(&self) -> bool {
        self.count >= self.capacity
    }
}

/// Index of the window containing `now`: `floor(epoch_seconds / window_seconds)`
pub fn window_key(now: DateTime<Utc>, window_seconds: u64) -> i64 {
    now.timestamp().div_euclid(window_span(window_seconds))
}

/// Seconds until the window containing `now` closes, in `(0, window_seconds]`
pub fn seconds_until_reset(now: DateTime<Utc>, window_seconds: u64) -> u64 {
    let span = window_span(window_seconds);
    (span - now.timestamp().rem_euclid(span)) as u64
}

/// Store key for a scope's counter in the given window
pub fn counter_key(prefix: &str, scope: &RateScope, window_key: i64) -> String {
    format!("{}:{}:{}", prefix, scope, window_key)
}

fn window_span(window_seconds: u64) -> i64 {
    i64::try_from(window_seconds.max(1)).unwrap_or(i64::MAX)
}
