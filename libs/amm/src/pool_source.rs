//! Pool-state reader collaborator
//!
//! The ledger read path that publishes pool snapshots lives outside this crate; the
//! gate only needs "give me the current snapshot of pool X".

use async_trait::async_trait;
use dashmap::DashMap;
use swapgate_types::{PoolInvariantError, PoolSnapshot};
use thiserror::Error;
use tracing::debug;

/// Failures reading pool state
#[derive(Debug, Clone, Error)]
pub enum PoolSourceError {
    #[error("Pool source unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Pool {pool_id} violates invariants: {source}")]
    Malformed {
        pool_id: String,
        #[source]
        source: PoolInvariantError,
    },
}

/// Supplies the latest known snapshot of a pool
#[async_trait]
pub trait PoolStateReader: Send + Sync {
    /// `Ok(None)` when no pool with this id is known
    async fn snapshot(&self, pool_id: &str) -> Result<Option<PoolSnapshot>, PoolSourceError>;
}

/// In-process pool book for local runs and tests
#[derive(Debug, Default)]
pub struct InMemoryPoolBook {
    pools: DashMap<String, PoolSnapshot>,
}

impl InMemoryPoolBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a snapshot, returning the previous one
    pub fn upsert(&self, snapshot: PoolSnapshot) -> Option<PoolSnapshot> {
        debug!(pool_id = %snapshot.pool_id, "Pool snapshot updated");
        self.pools.insert(snapshot.pool_id.clone(), snapshot)
    }

    pub fn remove(&self, pool_id: &str) -> Option<PoolSnapshot> {
        self.pools.remove(pool_id).map(|(_, snapshot)| snapshot)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

#[async_trait]
impl PoolStateReader for InMemoryPoolBook {
    async fn snapshot(&self, pool_id: &str) -> Result<Option<PoolSnapshot>, PoolSourceError> {
        Ok(self.pools.get(pool_id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(pool_id: &str, reserve_a: rust_decimal::Decimal) -> PoolSnapshot {
        PoolSnapshot {
            pool_id: pool_id.to_string(),
            symbol_a: "ETH".to_string(),
            symbol_b: "USDC".to_string(),
            reserve_a,
            reserve_b: dec!(200000),
            total_lp_supply: dec!(4472),
            fee_bps: 30,
        }
    }

    #[tokio::test]
    async fn test_pool_book_upsert_and_read() {
        let book = InMemoryPoolBook::new();
        assert!(book.is_empty());

        assert!(book.upsert(snapshot("eth-usdc", dec!(100))).is_none());
        let previous = book.upsert(snapshot("eth-usdc", dec!(101))).unwrap();
        assert_eq!(previous.reserve_a, dec!(100));
        assert_eq!(book.len(), 1);

        let current = book.snapshot("eth-usdc").await.unwrap().unwrap();
        assert_eq!(current.reserve_a, dec!(101));
        assert!(book.snapshot("btc-usdc").await.unwrap().is_none());

        book.remove("eth-usdc");
        assert!(book.snapshot("eth-usdc").await.unwrap().is_none());
    }
}
