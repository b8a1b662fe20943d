//! Capped exponential backoff with additive jitter

use rand::Rng;
use std::time::Duration;
use swapgate_config::PollerConfig;

/// Doubling delay: `initial, 2*initial, ...` capped at `max`, each plus `[0, max_jitter)`
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    current: Duration,
    max: Duration,
    max_jitter_ms: u64,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, max_jitter: Duration) -> Self {
        Self {
            initial,
            current: initial,
            max: max.max(initial),
            max_jitter_ms: max_jitter.as_millis() as u64,
        }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new(
            config.initial_delay(),
            config.max_delay(),
            Duration::from_millis(config.max_jitter_ms),
        )
    }

    /// Base delay the next call will use, before jitter
    pub fn current(&self) -> Duration {
        self.current.min(self.max)
    }

    /// Next delay with random jitter, then advance the base
    pub fn next_delay(&mut self) -> Duration {
        let jitter = if self.max_jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..self.max_jitter_ms))
        };
        self.next_delay_with_jitter(jitter)
    }

    /// Next delay with caller-chosen jitter, then advance the base
    pub fn next_delay_with_jitter(&mut self, jitter: Duration) -> Duration {
        let delay = self.current() + jitter;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&PollerConfig::default())
    }
}
