//! # SwapGate AMM - Constant-Product Pricing
//!
//! ## Purpose
//!
//! Exact pricing arithmetic for a single constant-product (`x * y = k`) pool: swap
//! quotes with fee deduction, the LP/protocol fee split, price impact in basis points,
//! LP mint estimates and the reverse (required input) quote.
//!
//! ## Integration Points
//!
//! - **Input Sources**: directional [`PoolState`] from a [`PoolStateReader`]
//! - **Output Destinations**: the swap gate pipeline, the `swapgate quote` CLI
//! - **Precision**: [`Decimal`] throughout; amounts are truncated toward zero at the
//!   configured scale so identical inputs always produce identical quotes
//!
//! ## Rounding Rules
//!
//! - `amount_out` and `lp_fee` truncate toward zero (never pays out more than the curve)
//! - `price_impact_bps` rounds half up and is clamped to `[0, 10000]`
//! - `required_input` rounds up (never asks for less than the curve needs)

pub mod constant_product;
pub mod error;
pub mod math;
pub mod pool_source;

pub use constant_product::PricingEngine;
pub use error::PricingError;
pub use math::decimal_sqrt;
pub use pool_source::{InMemoryPoolBook, PoolSourceError, PoolStateReader};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
pub use swapgate_types::{FeeSplit, PoolState, SwapQuote};
