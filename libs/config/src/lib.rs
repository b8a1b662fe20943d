//! # SwapGate Configuration
//!
//! Centralized configuration for the swap admission and pricing core.
//!
//! Every component receives its own immutable section at construction time; nothing
//! reads process-wide statics.
//!
//! ## Features
//!
//! - **Defaults**: fee shares, validation caps, rate windows and poll timings
//! - **Layered Loading**: base TOML file → environment TOML → `SWAPGATE__*` variables
//! - **Validation**: nonsensical combinations rejected before any component starts
//!
//! ## Usage
//!
//! ```rust,no_run
//! use swapgate_config::GateConfig;
//!
//! let config = GateConfig::load(None, Some("devnet"))?;
//! assert_eq!(config.admission.global.capacity, 2);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod gate_config;

pub use gate_config::{
    load_config, AdmissionConfig, GateConfig, IdempotencyConfig, LoggingConfig,
    MaintenanceConfig, PacerConfig, PollerConfig, PricingConfig, ValidationLimits, WindowLimit,
};
