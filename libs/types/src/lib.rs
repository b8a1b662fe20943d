//! # SwapGate Types
//!
//! Shared data model for the swap admission and pricing core.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: every amount and reserve is a [`Decimal`], never `f64`
//! - **Directional Pricing**: [`PoolState`] is always oriented input → output; the
//!   undirected ledger record is [`PoolSnapshot`]
//! - **Immutable Requests**: [`SwapRequest`] and [`SwapQuote`] are plain values produced
//!   once per trade and never cached across pool-state changes
//!
//! ## Quick Start
//!
//! ```rust
//! use swapgate_types::{dec, PoolSnapshot};
//!
//! let snapshot = PoolSnapshot {
//!     pool_id: "ETH-USDC".to_string(),
//!     symbol_a: "ETH".to_string(),
//!     symbol_b: "USDC".to_string(),
//!     reserve_a: dec!(100),
//!     reserve_b: dec!(200000),
//!     total_lp_supply: dec!(4472.13),
//!     fee_bps: 30,
//! };
//!
//! let state = snapshot.orient("usdc", "eth").unwrap();
//! assert_eq!(state.reserve_in, dec!(200000));
//! ```

pub mod bps;
pub mod pool;
pub mod swap;

pub use bps::{bps_to_decimal, decimal_to_bps, FeeSplit, BPS_DENOMINATOR};
pub use pool::{PoolInvariantError, PoolSnapshot, PoolState};
pub use swap::{SwapQuote, SwapRequest};

pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
