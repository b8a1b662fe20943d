//! Default configuration values
//!
//! Used by the `Default` impls in [`crate::gate_config`] and by tests that need the
//! canonical numbers.

/// Pricing defaults
pub mod pricing {
    /// Default pool fee (0.3%)
    pub const FEE_BPS: u32 = 30;

    /// Liquidity-provider share of the total fee (75%)
    pub const LP_FEE_SHARE_BPS: u32 = 7_500;

    /// Decimal places kept on computed amounts
    pub const AMOUNT_SCALE: u32 = 10;
}

/// Request validation caps
pub mod validation {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Dust floor for swap inputs
    pub const MIN_SWAP_AMOUNT: Decimal = dec!(0.000001);

    /// Hard cap on the price impact a client may tolerate (10%)
    pub const MAX_PRICE_IMPACT_BPS: i32 = 1_000;

    /// Longest deadline a request may ask for (60 minutes)
    pub const MAX_DEADLINE_SECONDS: i64 = 3_600;

    /// Deadline used when the client asks for none (10 minutes)
    pub const DEFAULT_DEADLINE_SECONDS: i64 = 600;

    /// Largest input relative to the input reserve (50%)
    pub const MAX_SWAP_RATIO: Decimal = dec!(0.5);

    /// Scale of the swap-ratio division
    pub const RATIO_SCALE: u32 = 10;
}

/// Admission (rate limiting) defaults
pub mod admission {
    /// Counter key prefix in the shared store
    pub const KEY_PREFIX: &str = "rl";

    /// Global window length (seconds)
    pub const GLOBAL_WINDOW_SECONDS: u64 = 5;

    /// Requests admitted per global window
    pub const GLOBAL_CAPACITY: u64 = 2;

    /// Per-party window length (seconds)
    pub const PARTY_WINDOW_SECONDS: u64 = 60;

    /// Requests admitted per party window
    pub const PARTY_CAPACITY: u64 = 10;
}

/// Consistency poller timings
pub mod poller {
    pub const INITIAL_DELAY_MS: u64 = 250;
    pub const MAX_DELAY_MS: u64 = 2_000;
    pub const MAX_JITTER_MS: u64 = 250;
    pub const MAX_WAIT_MS: u64 = 30_000;
}

/// Outbound ledger submission pacing
pub mod pacer {
    /// Minimum spacing between ledger submissions from one process
    pub const MIN_INTERVAL_MS: u64 = 400;
}

/// Idempotency cache
pub mod idempotency {
    /// How long a processed key is remembered (24 hours)
    pub const TTL_SECONDS: u64 = 86_400;

    pub const MAX_KEY_LENGTH: usize = 255;
}

/// Background housekeeping
pub mod maintenance {
    /// How often expired rate counters and idempotency entries are dropped
    pub const PURGE_INTERVAL_SECONDS: u64 = 60;
}
