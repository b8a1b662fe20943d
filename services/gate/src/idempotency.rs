//! Replay protection for client-supplied idempotency keys
//!
//! A key maps to the hash of the request body it was first used with and the response
//! produced for it. Reusing a key with the same body replays the response; reusing it
//! with a different body is a conflict.

use dashmap::DashMap;
use sha3::{Digest, Sha3_256};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdempotencyError {
    #[error("Idempotency key {key} was already used with a different request body")]
    BodyMismatch { key: String },
}

/// SHA3-256 of a request body, hex encoded
pub fn body_hash(body: &[u8]) -> String {
    hex::encode(Sha3_256::digest(body))
}

#[derive(Debug, Clone)]
struct CachedResponse<V> {
    body_hash: String,
    value: V,
    expires_at: Instant,
}

/// In-process response cache keyed by idempotency key
///
/// Expired entries are dropped when their key is looked up again or when
/// [`purge_expired`](Self::purge_expired) runs; the owner schedules the purge.
#[derive(Debug)]
pub struct IdempotencyCache<V> {
    entries: DashMap<String, CachedResponse<V>>,
    ttl: Duration,
}

impl<V: Clone> IdempotencyCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// `Ok(Some)` replays a cached response, `Ok(None)` means first use
    pub fn check(&self, key: &str, body_hash: &str) -> Result<Option<V>, IdempotencyError> {
        let now = Instant::now();
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };

        if entry.expires_at <= now {
            drop(entry);
            self.entries.remove_if(key, |_, cached| cached.expires_at <= now);
            return Ok(None);
        }

        if entry.body_hash != body_hash {
            warn!(key, "Idempotency key reused with a different body");
            return Err(IdempotencyError::BodyMismatch {
                key: key.to_string(),
            });
        }

        debug!(key, "Replaying cached response");
        Ok(Some(entry.value.clone()))
    }

    /// Remember the response produced for `key`
    pub fn register(&self, key: &str, body_hash: &str, value: V) {
        self.entries.insert(
            key.to_string(),
            CachedResponse {
                body_hash: body_hash.to_string(),
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, cached| cached.expires_at > now);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "Purged expired idempotency entries");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> IdempotencyCache<String> {
        IdempotencyCache::new(Duration::from_secs(60))
    }

    #[test]
    fn test_body_hash_is_stable_hex() {
        let hash = body_hash(br#"{"amount_in":"1"}"#);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, body_hash(br#"{"amount_in":"1"}"#));
        assert_ne!(hash, body_hash(br#"{"amount_in":"2"}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_key_then_replay() {
        let cache = cache();
        let hash = body_hash(b"swap-body");

        assert_eq!(cache.check("swap-abc", &hash).unwrap(), None);
        cache.register("swap-abc", &hash, "tx-123".to_string());
        assert_eq!(
            cache.check("swap-abc", &hash).unwrap(),
            Some("tx-123".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_different_body_conflicts() {
        let cache = cache();
        cache.register("swap-abc", &body_hash(b"first"), "tx-1".to_string());

        let err = cache.check("swap-abc", &body_hash(b"second")).unwrap_err();
        assert_eq!(
            err,
            IdempotencyError::BodyMismatch {
                key: "swap-abc".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = cache();
        let hash = body_hash(b"body");
        cache.register("key1", &hash, "resp1".to_string());
        cache.register("key2", &hash, "resp2".to_string());
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.check("key1", &hash).unwrap(), None);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }
}
