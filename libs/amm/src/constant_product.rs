//! Constant-product (x*y=k) swap pricing with exact Decimal arithmetic
//!
//! Amounts leaving the pool are truncated toward zero at the configured scale, which
//! keeps quotes bit-for-bit reproducible and can only grow the pool invariant.

use rust_decimal::{Decimal, RoundingStrategy};
use swapgate_config::PricingConfig;
use swapgate_types::{decimal_to_bps, FeeSplit, PoolState, SwapQuote, BPS_DENOMINATOR};
use tracing::debug;

use crate::error::PricingError;
use crate::math::{add, decimal_sqrt, div, mul};

/// Pure pricing functions for a single constant-product pool
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Split a pool fee between liquidity providers and the protocol
    pub fn split_fee(&self, fee_bps: u32) -> FeeSplit {
        FeeSplit::from_share(fee_bps, self.config.lp_fee_share_bps)
    }

    /// Quote a swap of `amount_in` against the given reserves
    ///
    /// `amount_in_net = amount_in * (10000 - fee_bps) / 10000` and
    /// `amount_out = reserve_out * amount_in_net / (reserve_in + amount_in_net)`,
    /// truncated at `amount_scale`. The result always satisfies
    /// `0 <= amount_out < reserve_out`.
    pub fn quote(
        &self,
        reserve_in: Decimal,
        reserve_out: Decimal,
        amount_in: Decimal,
        fee_bps: u32,
    ) -> Result<SwapQuote, PricingError> {
        check_reserves(reserve_in, reserve_out)?;
        if amount_in <= Decimal::ZERO {
            return Err(PricingError::InvalidAmount { amount: amount_in });
        }
        if fee_bps > BPS_DENOMINATOR {
            return Err(PricingError::InvalidFee { fee_bps });
        }

        let denominator = Decimal::from(BPS_DENOMINATOR);
        let amount_in_net = div(
            mul(amount_in, Decimal::from(BPS_DENOMINATOR - fee_bps), "net input")?,
            denominator,
            "net input",
        )?;

        let numerator = mul(reserve_out, amount_in_net, "output numerator")?;
        let new_reserve_in = add(reserve_in, amount_in_net, "output denominator")?;
        let amount_out = self.truncate(div(numerator, new_reserve_in, "output")?);

        // Decimal division rounds at 28 significant digits; never drain the pool
        if amount_out >= reserve_out {
            return Err(PricingError::InsufficientLiquidity {
                requested: amount_out,
                available: reserve_out,
            });
        }

        let fee_split = self.split_fee(fee_bps);
        let total_fee = amount_in - amount_in_net;
        let lp_fee = self.truncate(div(
            mul(amount_in, Decimal::from(fee_split.lp_bps), "lp fee")?,
            denominator,
            "lp fee",
        )?);
        let protocol_fee = total_fee - lp_fee;

        let price_impact_bps =
            self.price_impact_bps(reserve_in, reserve_out, amount_in, amount_out)?;

        debug!(
            %amount_in,
            %amount_out,
            fee_bps,
            price_impact_bps,
            "Quoted constant-product swap"
        );

        Ok(SwapQuote {
            amount_in,
            amount_in_net,
            amount_out,
            lp_fee,
            protocol_fee,
            price_impact_bps,
            fee_split,
        })
    }

    /// Quote against a directional pool state
    pub fn quote_pool(&self, pool: &PoolState, amount_in: Decimal) -> Result<SwapQuote, PricingError> {
        self.quote(pool.reserve_in, pool.reserve_out, amount_in, pool.fee_bps)
    }

    /// Price impact of a trade in basis points
    ///
    /// Compares the execution price `amount_out / amount_in` with the spot price
    /// `reserve_out / reserve_in`. Rounded half up, clamped to `[0, 10000]`.
    pub fn price_impact_bps(
        &self,
        reserve_in: Decimal,
        reserve_out: Decimal,
        amount_in: Decimal,
        amount_out: Decimal,
    ) -> Result<u32, PricingError> {
        check_reserves(reserve_in, reserve_out)?;
        if amount_in <= Decimal::ZERO {
            return Err(PricingError::InvalidAmount { amount: amount_in });
        }

        // (ideal - exec) / ideal == 1 - (amount_out * reserve_in) / (amount_in * reserve_out)
        let exec_over_ideal = div(
            mul(amount_out, reserve_in, "price impact")?,
            mul(amount_in, reserve_out, "price impact")?,
            "price impact",
        )?;
        let impact = decimal_to_bps(Decimal::ONE - exec_over_ideal);

        Ok(impact.min(BPS_DENOMINATOR))
    }

    /// Smallest input whose quote delivers at least `amount_out`
    ///
    /// Inverse of [`quote`](Self::quote), rounded up at `amount_scale`.
    pub fn required_input(
        &self,
        amount_out: Decimal,
        reserve_in: Decimal,
        reserve_out: Decimal,
        fee_bps: u32,
    ) -> Result<Decimal, PricingError> {
        check_reserves(reserve_in, reserve_out)?;
        if amount_out <= Decimal::ZERO {
            return Err(PricingError::InvalidAmount { amount: amount_out });
        }
        // A 100% fee leaves nothing to trade with
        if fee_bps >= BPS_DENOMINATOR {
            return Err(PricingError::InvalidFee { fee_bps });
        }
        if amount_out >= reserve_out {
            return Err(PricingError::InsufficientLiquidity {
                requested: amount_out,
                available: reserve_out,
            });
        }

        let numerator = mul(
            mul(reserve_in, amount_out, "required input")?,
            Decimal::from(BPS_DENOMINATOR),
            "required input",
        )?;
        let denominator = mul(
            reserve_out - amount_out,
            Decimal::from(BPS_DENOMINATOR - fee_bps),
            "required input",
        )?;

        Ok(div(numerator, denominator, "required input")?
            .round_dp_with_strategy(self.config.amount_scale, RoundingStrategy::AwayFromZero))
    }

    /// LP tokens minted for a deposit of `amount_a` and `amount_b`
    ///
    /// An unbootstrapped pool mints `sqrt(amount_a * amount_b)`. Otherwise the limiting
    /// token decides: `min(amount_a * supply / reserve_a, amount_b * supply / reserve_b)`.
    /// Non-positive amounts mint nothing.
    pub fn estimate_lp_mint(
        &self,
        amount_a: Decimal,
        amount_b: Decimal,
        reserve_a: Decimal,
        reserve_b: Decimal,
        total_lp_supply: Decimal,
    ) -> Result<Decimal, PricingError> {
        if amount_a <= Decimal::ZERO || amount_b <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let minted = if total_lp_supply <= Decimal::ZERO
            || reserve_a <= Decimal::ZERO
            || reserve_b <= Decimal::ZERO
        {
            bootstrap_mint(amount_a, amount_b)?
        } else {
            let share_a = div(mul(amount_a, total_lp_supply, "lp mint")?, reserve_a, "lp mint")?;
            let share_b = div(mul(amount_b, total_lp_supply, "lp mint")?, reserve_b, "lp mint")?;
            share_a.min(share_b)
        };

        Ok(self.truncate(minted))
    }

    fn truncate(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.config.amount_scale, RoundingStrategy::ToZero)
    }
}

/// `sqrt(a * b)`, taking the roots separately when the product itself overflows
fn bootstrap_mint(amount_a: Decimal, amount_b: Decimal) -> Result<Decimal, PricingError> {
    match amount_a.checked_mul(amount_b) {
        Some(product) => decimal_sqrt(product),
        None => mul(decimal_sqrt(amount_a)?, decimal_sqrt(amount_b)?, "lp mint"),
    }
}

fn check_reserves(reserve_in: Decimal, reserve_out: Decimal) -> Result<(), PricingError> {
    if reserve_in <= Decimal::ZERO || reserve_out <= Decimal::ZERO {
        return Err(PricingError::InvalidPoolState {
            reserve_in,
            reserve_out,
        });
    }
    Ok(())
}
