//! Counter store collaborator
//!
//! Production deployments back this with a shared store offering atomic increment with
//! expiry (e.g. Redis `INCR` + `EXPIRE`). [`InMemoryCounterStore`] provides the same
//! contract inside one process: correct for a single replica, not cluster-safe.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::StoreError;

/// Atomic counters with a time-to-live
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add one and return the new value
    ///
    /// `ttl` applies when the increment creates the counter; later increments keep the
    /// first expiry.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, StoreError>;

    /// Current value, `None` when the counter is absent or expired
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError>;

    /// Drop expired counters, returning how many were removed
    ///
    /// Stores with native key expiry have nothing to do here.
    async fn purge_expired(&self) -> usize {
        0
    }
}

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u64,
    expires_at: Instant,
}

/// Process-local counter store with lazy expiry
///
/// Expired windows are only replaced when their key is touched again, so a key that
/// is never reused stays until [`purge_expired`](Self::purge_expired) runs. The owner
/// schedules that purge, usually through `SwapGate::spawn_purge_task`.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: DashMap<String, CounterEntry>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired counter, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.counters.len();
        self.counters.retain(|_, entry| entry.expires_at > now);
        let purged = before.saturating_sub(self.counters.len());
        if purged > 0 {
            debug!(purged, "Purged expired rate counters");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        let now = Instant::now();
        // The entry guard holds the shard lock, making read-modify-write atomic per key
        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert(CounterEntry {
                count: 0,
                expires_at: now + ttl,
            });

        if entry.expires_at <= now {
            *entry = CounterEntry {
                count: 0,
                expires_at: now + ttl,
            };
        }
        entry.count += 1;
        Ok(entry.count)
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let now = Instant::now();
        Ok(self
            .counters
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.count))
    }

    async fn purge_expired(&self) -> usize {
        InMemoryCounterStore::purge_expired(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_increment_and_expiry() {
        let store = InMemoryCounterStore::new();
        let ttl = Duration::from_secs(5);

        assert_eq!(store.get("rl:global:1").await.unwrap(), None);
        assert_eq!(store.increment("rl:global:1", ttl).await.unwrap(), 1);
        assert_eq!(store.increment("rl:global:1", ttl).await.unwrap(), 2);
        assert_eq!(store.get("rl:global:1").await.unwrap(), Some(2));

        // Later increments do not extend the expiry
        tokio::time::advance(Duration::from_secs(3)).await;
        store.increment("rl:global:1", ttl).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.get("rl:global:1").await.unwrap(), None);

        // An expired counter restarts from one
        assert_eq!(store.increment("rl:global:1", ttl).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = InMemoryCounterStore::new();
        store.increment("short", Duration::from_secs(1)).await.unwrap();
        store.increment("long", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("long").await.unwrap(), Some(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryCounterStore::new());
        let ttl = Duration::from_secs(60);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..250 {
                        store.increment("shared", ttl).await.unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get("shared").await.unwrap(), Some(2_000));
    }
}
