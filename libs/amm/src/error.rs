//! Pricing error types

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by [`crate::PricingEngine`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("Invalid pool state: reserve_in={reserve_in}, reserve_out={reserve_out}")]
    InvalidPoolState {
        reserve_in: Decimal,
        reserve_out: Decimal,
    },

    #[error("Amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("Fee {fee_bps} bps outside [0, 10000]")]
    InvalidFee { fee_bps: u32 },

    #[error("Insufficient liquidity: requested {requested}, reserve {available}")]
    InsufficientLiquidity {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Decimal overflow in {operation}")]
    Overflow { operation: &'static str },
}

impl PricingError {
    /// Errors caused by the pool rather than by the request
    pub fn is_pool_problem(&self) -> bool {
        matches!(
            self,
            PricingError::InvalidPoolState { .. } | PricingError::InsufficientLiquidity { .. }
        )
    }
}
