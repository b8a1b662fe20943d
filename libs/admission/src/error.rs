//! Admission error types

use thiserror::Error;

use crate::window::RateScope;

/// Counter store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Counter store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Counter {key} holds a non-numeric value: {value}")]
    Corrupt { key: String, value: String },
}

/// Request denied by a saturated rate window
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Rate limit exceeded for {scope}, retry after {retry_after_seconds}s")]
pub struct RateLimitExceeded {
    pub scope: RateScope,
    pub retry_after_seconds: u64,
}
