//! Read-your-writes poller
//!
//! Fetches until the result satisfies a predicate, sleeping with capped exponential
//! backoff between attempts. No sleep ever extends past the deadline, and every sleep
//! races the cancellation signal when one is supplied.

use std::future::Future;
use std::time::Duration;
use swapgate_config::PollerConfig;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::backoff::Backoff;
use crate::cancel::CancellationSignal;
use crate::error::ConsistencyError;

/// Bounded poller configured once and shared freely
#[derive(Debug, Clone, Default)]
pub struct ConsistencyPoller {
    config: PollerConfig,
}

impl ConsistencyPoller {
    pub fn new(config: PollerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Poll `fetch` until `is_good` accepts a value or `max_wait` elapses
    ///
    /// A good first fetch returns immediately without sleeping. `None` from `fetch`
    /// means "not visible yet" and is retried like a rejected value. `Duration::MAX`
    /// waits without a deadline.
    pub async fn poll_until<T, F, Fut, P>(
        &self,
        fetch: F,
        is_good: P,
        max_wait: Duration,
        description: &str,
    ) -> Result<T, ConsistencyError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
        P: Fn(&T) -> bool,
    {
        self.run(fetch, is_good, max_wait, description, None).await
    }

    /// [`poll_until`](Self::poll_until) with the configured default wait
    pub async fn poll_until_default<T, F, Fut, P>(
        &self,
        fetch: F,
        is_good: P,
        description: &str,
    ) -> Result<T, ConsistencyError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
        P: Fn(&T) -> bool,
    {
        self.run(fetch, is_good, self.config.default_max_wait(), description, None)
            .await
    }

    /// [`poll_until`](Self::poll_until) that also stops when `signal` fires
    pub async fn poll_until_cancellable<T, F, Fut, P>(
        &self,
        fetch: F,
        is_good: P,
        max_wait: Duration,
        description: &str,
        mut signal: CancellationSignal,
    ) -> Result<T, ConsistencyError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
        P: Fn(&T) -> bool,
    {
        self.run(fetch, is_good, max_wait, description, Some(&mut signal))
            .await
    }

    async fn run<T, F, Fut, P>(
        &self,
        mut fetch: F,
        is_good: P,
        max_wait: Duration,
        description: &str,
        mut signal: Option<&mut CancellationSignal>,
    ) -> Result<T, ConsistencyError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
        P: Fn(&T) -> bool,
    {
        let start = Instant::now();
        // A wait too long to represent as an instant has no deadline
        let deadline = start.checked_add(max_wait);
        let mut backoff = Backoff::from_config(&self.config);
        let mut attempts: u32 = 0;

        let cancelled = |attempts: u32| ConsistencyError::Cancelled {
            description: description.to_string(),
            attempts,
        };

        while deadline.map_or(true, |deadline| Instant::now() < deadline) {
            if signal.as_ref().is_some_and(|s| s.is_cancelled()) {
                info!(description, attempts, "Poll cancelled");
                return Err(cancelled(attempts));
            }

            attempts += 1;
            if let Some(value) = fetch().await {
                if is_good(&value) {
                    info!(
                        description,
                        attempts,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Read path caught up"
                    );
                    return Ok(value);
                }
            }

            let mut wait = backoff.next_delay();
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                wait = wait.min(deadline - now);
            }
            debug!(
                description,
                attempts,
                wait_ms = wait.as_millis() as u64,
                "Read path not caught up, backing off"
            );

            match signal.as_deref_mut() {
                Some(signal) => {
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = signal.cancelled() => {
                            info!(description, attempts, "Poll cancelled");
                            return Err(cancelled(attempts));
                        }
                    }
                }
                None => tokio::time::sleep(wait).await,
            }
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        error!(description, attempts, elapsed_ms, "Timed out waiting for read path");
        Err(ConsistencyError::Timeout {
            description: description.to_string(),
            attempts,
            elapsed_ms,
        })
    }
}
