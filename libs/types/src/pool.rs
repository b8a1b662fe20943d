//! Pool state as read from the ledger
//!
//! The ledger stores pools undirected (token A / token B). Pricing always works on a
//! directional [`PoolState`], obtained through [`PoolSnapshot::orient`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bps::BPS_DENOMINATOR;

/// Pool invariant violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolInvariantError {
    #[error("Negative reserve: {0}")]
    NegativeReserve(Decimal),

    #[error("Negative LP supply: {0}")]
    NegativeLpSupply(Decimal),

    #[error("Bootstrapped pool (LP supply {lp_supply}) has an empty reserve")]
    EmptyReserve { lp_supply: Decimal },

    #[error("Fee {0} bps exceeds 10000")]
    FeeOutOfRange(u32),
}

/// Directional pool view: reserves of the token being sold (`in`) and bought (`out`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub reserve_in: Decimal,
    pub reserve_out: Decimal,
    pub total_lp_supply: Decimal,
    pub fee_bps: u32,
}

impl PoolState {
    /// A pool is bootstrapped once LP tokens exist
    pub fn is_bootstrapped(&self) -> bool {
        self.total_lp_supply > Decimal::ZERO
    }

    /// Check the invariants the ledger is expected to uphold
    pub fn check_invariants(&self) -> Result<(), PoolInvariantError> {
        for reserve in [self.reserve_in, self.reserve_out] {
            if reserve.is_sign_negative() && !reserve.is_zero() {
                return Err(PoolInvariantError::NegativeReserve(reserve));
            }
        }
        if self.total_lp_supply.is_sign_negative() && !self.total_lp_supply.is_zero() {
            return Err(PoolInvariantError::NegativeLpSupply(self.total_lp_supply));
        }
        if self.is_bootstrapped()
            && (self.reserve_in <= Decimal::ZERO || self.reserve_out <= Decimal::ZERO)
        {
            return Err(PoolInvariantError::EmptyReserve {
                lp_supply: self.total_lp_supply,
            });
        }
        if self.fee_bps > BPS_DENOMINATOR {
            return Err(PoolInvariantError::FeeOutOfRange(self.fee_bps));
        }
        Ok(())
    }

    /// Spot price of the output token in input-token units (`reserve_out / reserve_in`)
    pub fn spot_price(&self) -> Option<Decimal> {
        if self.reserve_in <= Decimal::ZERO {
            return None;
        }
        self.reserve_out.checked_div(self.reserve_in)
    }
}

/// Undirected pool record as published by the ledger read path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool_id: String,
    pub symbol_a: String,
    pub symbol_b: String,
    pub reserve_a: Decimal,
    pub reserve_b: Decimal,
    pub total_lp_supply: Decimal,
    pub fee_bps: u32,
}

impl PoolSnapshot {
    /// Orient the pool for a trade selling `input_symbol` for `output_symbol`
    ///
    /// Symbols match case-insensitively in either direction. Returns `None` when the
    /// pair does not belong to this pool.
    pub fn orient(&self, input_symbol: &str, output_symbol: &str) -> Option<PoolState> {
        let is_a = |s: &str| s.eq_ignore_ascii_case(&self.symbol_a);
        let is_b = |s: &str| s.eq_ignore_ascii_case(&self.symbol_b);

        let (reserve_in, reserve_out) = if is_a(input_symbol) && is_b(output_symbol) {
            (self.reserve_a, self.reserve_b)
        } else if is_b(input_symbol) && is_a(output_symbol) {
            (self.reserve_b, self.reserve_a)
        } else {
            return None;
        };

        Some(PoolState {
            reserve_in,
            reserve_out,
            total_lp_supply: self.total_lp_supply,
            fee_bps: self.fee_bps,
        })
    }

    /// Whether the pool trades the given symbol
    pub fn contains_symbol(&self, symbol: &str) -> bool {
        symbol.eq_ignore_ascii_case(&self.symbol_a) || symbol.eq_ignore_ascii_case(&self.symbol_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eth_usdc() -> PoolSnapshot {
        PoolSnapshot {
            pool_id: "eth-usdc".to_string(),
            symbol_a: "ETH".to_string(),
            symbol_b: "USDC".to_string(),
            reserve_a: dec!(100),
            reserve_b: dec!(200000),
            total_lp_supply: dec!(4472.1359549995),
            fee_bps: 30,
        }
    }

    #[test]
    fn test_orient_both_directions() {
        let pool = eth_usdc();

        let sell_eth = pool.orient("ETH", "USDC").unwrap();
        assert_eq!(sell_eth.reserve_in, dec!(100));
        assert_eq!(sell_eth.reserve_out, dec!(200000));

        let sell_usdc = pool.orient("usdc", "eth").unwrap();
        assert_eq!(sell_usdc.reserve_in, dec!(200000));
        assert_eq!(sell_usdc.reserve_out, dec!(100));
        assert_eq!(sell_usdc.fee_bps, 30);
    }

    #[test]
    fn test_orient_rejects_foreign_pair() {
        let pool = eth_usdc();
        assert!(pool.orient("BTC", "USDC").is_none());
        assert!(pool.orient("ETH", "ETH").is_none());
    }

    #[test]
    fn test_invariants() {
        let state = eth_usdc().orient("ETH", "USDC").unwrap();
        assert!(state.is_bootstrapped());
        assert!(state.check_invariants().is_ok());
        assert_eq!(state.spot_price(), Some(dec!(2000)));

        let drained = PoolState {
            reserve_out: dec!(0),
            ..state.clone()
        };
        assert!(matches!(
            drained.check_invariants(),
            Err(PoolInvariantError::EmptyReserve { .. })
        ));

        // An empty, unbootstrapped pool is legitimate
        let fresh = PoolState {
            reserve_in: dec!(0),
            reserve_out: dec!(0),
            total_lp_supply: dec!(0),
            fee_bps: 30,
        };
        assert!(fresh.check_invariants().is_ok());
        assert_eq!(fresh.spot_price(), None);

        let bad_fee = PoolState {
            fee_bps: 10_001,
            ..state
        };
        assert_eq!(
            bad_fee.check_invariants(),
            Err(PoolInvariantError::FeeOutOfRange(10_001))
        );
    }
}
