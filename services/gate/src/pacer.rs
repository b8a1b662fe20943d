//! Outbound ledger submission pacing
//!
//! Spaces writes from this process by a minimum interval using a GCRA limiter with a
//! burst of one. Pacing is per process, not cluster-wide.

use governor::{DefaultDirectRateLimiter, Quota};
use std::time::Duration;
use swapgate_config::PacerConfig;
use tracing::debug;

/// Enforces a minimum gap between ledger submissions
pub struct SubmissionPacer {
    limiter: Option<DefaultDirectRateLimiter>,
    min_interval: Duration,
}

impl SubmissionPacer {
    /// A zero interval disables pacing
    pub fn new(config: &PacerConfig) -> Self {
        let min_interval = Duration::from_millis(config.min_interval_ms);
        let limiter = Quota::with_period(min_interval).map(DefaultDirectRateLimiter::direct);
        Self {
            limiter,
            min_interval,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next submission slot opens
    pub async fn await_slot(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
            debug!("Submission slot granted");
        }
    }

    /// Take a slot if one is open now (non-blocking)
    pub fn try_slot(&self) -> bool {
        self.limiter
            .as_ref()
            .map(|limiter| limiter.check().is_ok())
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_zero_interval_disables_pacing() {
        let pacer = SubmissionPacer::new(&PacerConfig { min_interval_ms: 0 });
        assert!(!pacer.is_enabled());
        for _ in 0..100 {
            assert!(pacer.try_slot());
        }
    }

    #[test]
    fn test_second_immediate_slot_is_refused() {
        let pacer = SubmissionPacer::new(&PacerConfig {
            min_interval_ms: 10_000,
        });
        assert!(pacer.is_enabled());
        assert!(pacer.try_slot());
        assert!(!pacer.try_slot());
    }

    #[tokio::test]
    async fn test_await_slot_spaces_submissions() {
        let pacer = SubmissionPacer::new(&PacerConfig { min_interval_ms: 50 });
        let start = Instant::now();

        pacer.await_slot().await;
        pacer.await_slot().await;

        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
