//! Gate Configuration Module
//!
//! Provides configuration loading for the swap gate and its components.
//! Supports loading from TOML files with environment-specific overrides.

use anyhow::{ensure, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::defaults;

const BPS_DENOMINATOR: u32 = 10_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub logging: LoggingConfig,
    pub pricing: PricingConfig,
    pub validation: ValidationLimits,
    pub admission: AdmissionConfig,
    pub poller: PollerConfig,
    pub pacer: PacerConfig,
    pub idempotency: IdempotencyConfig,
    pub maintenance: MaintenanceConfig,
}

/// Log output settings for the service binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Fee split and rounding for the pricing engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// LP share of the total fee in bps of the fee (7500 = 75%)
    pub lp_fee_share_bps: u32,
    /// Decimal places kept on computed amounts
    pub amount_scale: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            lp_fee_share_bps: defaults::pricing::LP_FEE_SHARE_BPS,
            amount_scale: defaults::pricing::AMOUNT_SCALE,
        }
    }
}

/// Caps and floors enforced on incoming swap requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub min_swap_amount: Decimal,
    pub max_price_impact_bps: i32,
    pub max_deadline_seconds: i64,
    pub default_deadline_seconds: i64,
    pub max_swap_ratio: Decimal,
    pub ratio_scale: u32,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_swap_amount: defaults::validation::MIN_SWAP_AMOUNT,
            max_price_impact_bps: defaults::validation::MAX_PRICE_IMPACT_BPS,
            max_deadline_seconds: defaults::validation::MAX_DEADLINE_SECONDS,
            default_deadline_seconds: defaults::validation::DEFAULT_DEADLINE_SECONDS,
            max_swap_ratio: defaults::validation::MAX_SWAP_RATIO,
            ratio_scale: defaults::validation::RATIO_SCALE,
        }
    }
}

/// One fixed rate window: at most `capacity` requests per `window_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimit {
    pub window_seconds: u64,
    pub capacity: u64,
}

impl WindowLimit {
    pub fn new(window_seconds: u64, capacity: u64) -> Self {
        Self {
            window_seconds,
            capacity,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Cluster-wide admission control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    pub enabled: bool,
    pub key_prefix: String,
    pub global: WindowLimit,
    pub party: WindowLimit,
    /// Admit when the counter store is unreachable instead of denying
    pub fail_open: bool,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_prefix: defaults::admission::KEY_PREFIX.to_string(),
            global: WindowLimit::new(
                defaults::admission::GLOBAL_WINDOW_SECONDS,
                defaults::admission::GLOBAL_CAPACITY,
            ),
            party: WindowLimit::new(
                defaults::admission::PARTY_WINDOW_SECONDS,
                defaults::admission::PARTY_CAPACITY,
            ),
            fail_open: true,
        }
    }
}

/// Backoff timings for read-your-writes polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_jitter_ms: u64,
    pub default_max_wait_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: defaults::poller::INITIAL_DELAY_MS,
            max_delay_ms: defaults::poller::MAX_DELAY_MS,
            max_jitter_ms: defaults::poller::MAX_JITTER_MS,
            default_max_wait_ms: defaults::poller::MAX_WAIT_MS,
        }
    }
}

impl PollerConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn default_max_wait(&self) -> Duration {
        Duration::from_millis(self.default_max_wait_ms)
    }
}

/// Spacing of outbound ledger submissions; 0 disables pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacerConfig {
    pub min_interval_ms: u64,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: defaults::pacer::MIN_INTERVAL_MS,
        }
    }
}

/// Duplicate-submission protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdempotencyConfig {
    pub ttl_seconds: u64,
    pub max_key_length: usize,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: defaults::idempotency::TTL_SECONDS,
            max_key_length: defaults::idempotency::MAX_KEY_LENGTH,
        }
    }
}

/// Periodic purge of expired in-process state; 0 disables the purge task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub purge_interval_seconds: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            purge_interval_seconds: defaults::maintenance::PURGE_INTERVAL_SECONDS,
        }
    }
}

impl MaintenanceConfig {
    /// `None` when the purge task is disabled
    pub fn purge_interval(&self) -> Option<Duration> {
        (self.purge_interval_seconds > 0).then(|| Duration::from_secs(self.purge_interval_seconds))
    }
}

impl GateConfig {
    /// Load configuration from files with environment overrides
    ///
    /// Sources, lowest precedence first: `base_path` (default
    /// `config/swapgate.toml`), `config/environments/<environment>.toml` when present,
    /// then `SWAPGATE__<SECTION>__<FIELD>` environment variables.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new("config/swapgate.toml"));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        if let Some(env) = environment {
            let env_file = PathBuf::from("config/environments").join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("SWAPGATE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: GateConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Load a single TOML file without environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: GateConfig = Config::builder()
            .add_source(File::from(path).required(true))
            .build()
            .with_context(|| format!("Failed to read {}", path.display()))?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.pricing.lp_fee_share_bps <= BPS_DENOMINATOR,
            "pricing.lp_fee_share_bps {} exceeds 10000",
            self.pricing.lp_fee_share_bps
        );
        ensure!(
            self.pricing.amount_scale <= 28,
            "pricing.amount_scale {} exceeds decimal precision (28)",
            self.pricing.amount_scale
        );

        let v = &self.validation;
        ensure!(
            v.min_swap_amount > Decimal::ZERO,
            "validation.min_swap_amount must be positive"
        );
        ensure!(
            (0..=BPS_DENOMINATOR as i32).contains(&v.max_price_impact_bps),
            "validation.max_price_impact_bps {} outside [0, 10000]",
            v.max_price_impact_bps
        );
        ensure!(
            v.max_deadline_seconds >= 1,
            "validation.max_deadline_seconds must be at least 1"
        );
        ensure!(
            (1..=v.max_deadline_seconds).contains(&v.default_deadline_seconds),
            "validation.default_deadline_seconds {} outside [1, {}]",
            v.default_deadline_seconds,
            v.max_deadline_seconds
        );
        ensure!(
            v.max_swap_ratio > Decimal::ZERO && v.max_swap_ratio <= Decimal::ONE,
            "validation.max_swap_ratio {} outside (0, 1]",
            v.max_swap_ratio
        );

        for (name, limit) in [("global", self.admission.global), ("party", self.admission.party)] {
            ensure!(
                limit.window_seconds > 0,
                "admission.{}.window_seconds must be positive",
                name
            );
        }
        ensure!(
            !self.admission.key_prefix.is_empty(),
            "admission.key_prefix cannot be empty"
        );

        let p = &self.poller;
        ensure!(p.initial_delay_ms > 0, "poller.initial_delay_ms must be positive");
        ensure!(
            p.max_delay_ms >= p.initial_delay_ms,
            "poller.max_delay_ms {} below initial_delay_ms {}",
            p.max_delay_ms,
            p.initial_delay_ms
        );

        ensure!(
            self.idempotency.max_key_length > 0,
            "idempotency.max_key_length must be positive"
        );

        Ok(())
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(environment: Option<&str>) -> Result<GateConfig> {
    GateConfig::load(None, environment)
}
