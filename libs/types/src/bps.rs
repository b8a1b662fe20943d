//! Basis-point helpers and the LP/protocol fee split

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 10000 bps = 100%
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Convert basis points to a decimal fraction (30 → 0.003)
pub fn bps_to_decimal(bps: u32) -> Decimal {
    Decimal::from(bps) / Decimal::from(BPS_DENOMINATOR)
}

/// Convert a decimal fraction to basis points, rounding half up (0.003 → 30)
///
/// Negative fractions and values beyond `u32` saturate to the nearest bound.
pub fn decimal_to_bps(fraction: Decimal) -> u32 {
    let Some(scaled) = fraction.checked_mul(Decimal::from(BPS_DENOMINATOR)) else {
        return if fraction.is_sign_negative() { 0 } else { u32::MAX };
    };
    let bps = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if bps.is_sign_negative() {
        return 0;
    }
    bps.to_u32().unwrap_or(u32::MAX)
}

/// Split of a pool's total fee between liquidity providers and the protocol
///
/// `lp_bps + protocol_bps == total_bps` always holds: the protocol share is the
/// remainder of the LP share, never rounded on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub total_bps: u32,
    pub lp_bps: u32,
    pub protocol_bps: u32,
}

impl FeeSplit {
    /// Split `total_bps` giving liquidity providers `floor(total * lp_share_bps / 10000)`
    pub fn from_share(total_bps: u32, lp_share_bps: u32) -> Self {
        let lp_share_bps = lp_share_bps.min(BPS_DENOMINATOR);
        let lp_bps = (u64::from(total_bps) * u64::from(lp_share_bps) / u64::from(BPS_DENOMINATOR)) as u32;
        Self {
            total_bps,
            lp_bps,
            protocol_bps: total_bps - lp_bps,
        }
    }
}
