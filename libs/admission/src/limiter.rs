//! Two-level admission limiter: a global window, then a per-party window
//!
//! The global counter is checked and bumped first. A request denied at the party level
//! has already consumed a global slot; the global increment is not rolled back.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use swapgate_config::{AdmissionConfig, WindowLimit};
use tracing::{debug, warn};

use crate::error::{RateLimitExceeded, StoreError};
use crate::store::CounterStore;
use crate::window::{counter_key, seconds_until_reset, window_key, RateScope, RateWindow};

/// Cluster-wide fixed-window limiter over a shared [`CounterStore`]
#[derive(Debug)]
pub struct AdmissionLimiter<S> {
    store: Arc<S>,
    config: AdmissionConfig,
}

impl<S> Clone for AdmissionLimiter<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: CounterStore> AdmissionLimiter<S> {
    pub fn new(store: Arc<S>, config: AdmissionConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Drop counters of windows that have already closed
    pub async fn purge_expired(&self) -> usize {
        self.store.purge_expired().await
    }

    /// Admit or deny one request from `identity` at `now`
    ///
    /// A blank identity is treated as anonymous and only counts against the global
    /// window.
    pub async fn try_acquire(&self, identity: Option<&str>, now: DateTime<Utc>) -> bool {
        self.check(identity, now).await.is_none()
    }

    /// Like [`try_acquire`](Self::try_acquire), reporting the denying scope and a retry hint
    pub async fn acquire(
        &self,
        identity: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), RateLimitExceeded> {
        let Some(scope) = self.check(identity, now).await else {
            return Ok(());
        };

        // The denying scope's own reset bounds the hint from below when a later read
        // finds the window already rolled over
        let denied_window = self.limit_for(&scope).window_seconds;
        let retry_after_seconds = self
            .retry_after_seconds(identity, now)
            .await
            .max(seconds_until_reset(now, denied_window));

        Err(RateLimitExceeded {
            scope,
            retry_after_seconds,
        })
    }

    /// Seconds until every saturated window has reset; 0 when nothing is saturated
    pub async fn retry_after_seconds(&self, identity: Option<&str>, now: DateTime<Utc>) -> u64 {
        if !self.config.enabled {
            return 0;
        }

        let mut retry_after = 0;
        for scope in self.scopes(identity) {
            let limit = self.limit_for(&scope);
            let saturated = match self.read_count(&scope, now).await {
                Some(count) => count >= limit.capacity,
                None => true,
            };
            if saturated {
                retry_after = retry_after.max(seconds_until_reset(now, limit.window_seconds));
            }
        }
        retry_after
    }

    /// Current state of one scope's window
    pub async fn window(&self, scope: RateScope, now: DateTime<Utc>) -> Result<RateWindow, StoreError> {
        let limit = self.limit_for(&scope);
        let key = window_key(now, limit.window_seconds);
        let count = self
            .store
            .get(&counter_key(&self.config.key_prefix, &scope, key))
            .await?
            .unwrap_or(0);

        Ok(RateWindow {
            scope,
            window_seconds: limit.window_seconds,
            capacity: limit.capacity,
            count,
            window_key: key,
        })
    }

    /// Returns the scope that denied the request, `None` when admitted
    async fn check(&self, identity: Option<&str>, now: DateTime<Utc>) -> Option<RateScope> {
        if !self.config.enabled {
            return None;
        }

        for scope in self.scopes(identity) {
            let limit = self.limit_for(&scope);

            let admitted = match self.read_count(&scope, now).await {
                Some(count) if count < limit.capacity => self.bump(&scope, now).await,
                _ => false,
            };

            if !admitted {
                warn!(
                    scope = %scope,
                    capacity = limit.capacity,
                    window_seconds = limit.window_seconds,
                    "Rate limit exceeded"
                );
                return Some(scope);
            }
        }

        debug!(identity = identity.unwrap_or("-"), "Request admitted");
        None
    }

    fn scopes(&self, identity: Option<&str>) -> Vec<RateScope> {
        let mut scopes = vec![RateScope::Global];
        if let Some(id) = identity.map(str::trim).filter(|id| !id.is_empty()) {
            scopes.push(RateScope::Party(id.to_string()));
        }
        scopes
    }

    fn limit_for(&self, scope: &RateScope) -> WindowLimit {
        match scope {
            RateScope::Global => self.config.global,
            RateScope::Party(_) => self.config.party,
        }
    }

    fn key_for(&self, scope: &RateScope, now: DateTime<Utc>) -> String {
        let limit = self.limit_for(scope);
        counter_key(
            &self.config.key_prefix,
            scope,
            window_key(now, limit.window_seconds),
        )
    }

    /// Count in the current window; `None` means "treat as saturated"
    async fn read_count(&self, scope: &RateScope, now: DateTime<Utc>) -> Option<u64> {
        let key = self.key_for(scope, now);
        match self.store.get(&key).await {
            Ok(count) => Some(count.unwrap_or(0)),
            Err(e) if self.config.fail_open => {
                warn!(key = %key, error = %e, "Counter read failed, admitting");
                Some(0)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Counter read failed, denying");
                None
            }
        }
    }

    /// Increment the current window; `false` means "deny"
    async fn bump(&self, scope: &RateScope, now: DateTime<Utc>) -> bool {
        let key = self.key_for(scope, now);
        let ttl = self.limit_for(scope).window();
        match self.store.increment(&key, ttl).await {
            Ok(count) => {
                debug!(key = %key, count, "Counter incremented");
                true
            }
            Err(e) => {
                warn!(
                    key = %key,
                    error = %e,
                    fail_open = self.config.fail_open,
                    "Counter increment failed"
                );
                self.config.fail_open
            }
        }
    }
}
