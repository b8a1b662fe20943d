//! Error types for the swap gate

use swapgate_admission::RateLimitExceeded;
use swapgate_amm::{PoolSourceError, PricingError};
use swapgate_consistency::ConsistencyError;
use swapgate_validation::ValidationError;
use thiserror::Error;

use crate::idempotency::IdempotencyError;

/// Result type alias for gate operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Every way a swap can be stopped by the gate
#[derive(Debug, Error)]
pub enum GateError {
    /// Request broke a static or post-execution rule
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Admission denied; carries the retry hint
    #[error(transparent)]
    RateLimited(#[from] RateLimitExceeded),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Read path did not reflect the write in time, or the wait was cancelled
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("Pool {pool_id} not found")]
    PoolNotFound { pool_id: String },

    #[error("Pool {pool_id} does not trade {input_symbol} for {output_symbol}")]
    PairNotInPool {
        pool_id: String,
        input_symbol: String,
        output_symbol: String,
    },

    #[error(transparent)]
    PoolSource(#[from] PoolSourceError),

    #[error(transparent)]
    Idempotency(#[from] IdempotencyError),
}

impl GateError {
    /// The same request may succeed if sent again later
    pub fn is_retryable(&self) -> bool {
        match self {
            GateError::RateLimited(_) => true,
            GateError::Consistency(e) => e.is_retryable(),
            GateError::PoolSource(PoolSourceError::Unavailable { .. }) => true,
            _ => false,
        }
    }

    /// The ledger write may have happened even though the gate reports failure
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, GateError::Consistency(e) if e.is_indeterminate())
    }

    /// Seconds the client should wait before retrying, when known
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            GateError::RateLimited(e) => Some(e.retry_after_seconds),
            _ => None,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            GateError::Validation(e) => e.kind.as_str(),
            GateError::RateLimited(_) => "RATE_LIMITED",
            GateError::Pricing(_) => "PRICING_FAILED",
            GateError::Consistency(ConsistencyError::Timeout { .. }) => "CONSISTENCY_TIMEOUT",
            GateError::Consistency(ConsistencyError::Cancelled { .. }) => "CANCELLED",
            GateError::PoolNotFound { .. } => "POOL_NOT_FOUND",
            GateError::PairNotInPool { .. } => "PAIR_NOT_IN_POOL",
            GateError::PoolSource(_) => "POOL_SOURCE_FAILED",
            GateError::Idempotency(_) => "IDEMPOTENCY_CONFLICT",
        }
    }
}
