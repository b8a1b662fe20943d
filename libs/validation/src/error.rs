//! Validation error types

use std::fmt;
use thiserror::Error;

/// Which rule a request broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    AmountNonPositive,
    AmountTooSmall,
    InvalidMinOutput,
    PriceImpactCapInvalid,
    InvalidTokenPair,
    DeadlineExpired,
    SwapRatioExceeded,
    PoolEmpty,
    MinOutputNotMet,
    PriceImpactExceeded,
    InvalidIdempotencyKey,
}

impl ValidationErrorKind {
    /// Stable machine-readable code
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::AmountNonPositive => "AMOUNT_NON_POSITIVE",
            ValidationErrorKind::AmountTooSmall => "AMOUNT_TOO_SMALL",
            ValidationErrorKind::InvalidMinOutput => "INVALID_MIN_OUTPUT",
            ValidationErrorKind::PriceImpactCapInvalid => "PRICE_IMPACT_CAP_INVALID",
            ValidationErrorKind::InvalidTokenPair => "INVALID_TOKEN_PAIR",
            ValidationErrorKind::DeadlineExpired => "DEADLINE_EXPIRED",
            ValidationErrorKind::SwapRatioExceeded => "SWAP_RATIO_EXCEEDED",
            ValidationErrorKind::PoolEmpty => "POOL_EMPTY",
            ValidationErrorKind::MinOutputNotMet => "MIN_OUTPUT_NOT_MET",
            ValidationErrorKind::PriceImpactExceeded => "PRICE_IMPACT_EXCEEDED",
            ValidationErrorKind::InvalidIdempotencyKey => "INVALID_IDEMPOTENCY_KEY",
        }
    }

    /// Raised after the trade executed rather than before it
    pub fn is_post_execution(&self) -> bool {
        matches!(
            self,
            ValidationErrorKind::MinOutputNotMet | ValidationErrorKind::PriceImpactExceeded
        )
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected request: the broken rule plus a human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {details}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub details: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
        }
    }
}
