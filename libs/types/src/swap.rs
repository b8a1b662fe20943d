//! Swap requests and the quotes produced for them

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bps::FeeSplit;

/// An incoming trade request, validated and priced once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub input_symbol: String,
    pub output_symbol: String,
    pub amount_in: Decimal,
    /// Slippage floor: the trade must deliver at least this much
    pub min_output: Decimal,
    /// Signed so that negative client input can be represented and rejected
    pub max_price_impact_bps: i32,
    pub deadline: DateTime<Utc>,
}

/// Price for a single swap against a single pool state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_in: Decimal,
    /// Input remaining after the total fee is taken
    pub amount_in_net: Decimal,
    pub amount_out: Decimal,
    pub lp_fee: Decimal,
    pub protocol_fee: Decimal,
    pub price_impact_bps: u32,
    pub fee_split: FeeSplit,
}

impl SwapQuote {
    pub fn total_fee(&self) -> Decimal {
        self.lp_fee + self.protocol_fee
    }

    /// Effective execution price (output per unit input)
    pub fn execution_price(&self) -> Option<Decimal> {
        if self.amount_in.is_zero() {
            return None;
        }
        self.amount_out.checked_div(self.amount_in)
    }
}
