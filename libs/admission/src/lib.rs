//! # SwapGate Admission
//!
//! Distributed fixed-window rate limiting. Every gate replica counts requests in the
//! same external store, so the limits hold across the whole cluster rather than per
//! process.
//!
//! ## Windows
//!
//! Time is cut into fixed windows of `window_seconds`. A request at epoch second `t`
//! lands in window `floor(t / window_seconds)` and is counted under
//! `<prefix>:<scope>:<window>`, where scope is `global` or `party:<id>`. Counters expire
//! with their window.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use swapgate_admission::{AdmissionLimiter, InMemoryCounterStore};
//! use swapgate_config::AdmissionConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemoryCounterStore::new());
//! let limiter = AdmissionLimiter::new(store, AdmissionConfig::default());
//!
//! let now = chrono::Utc::now();
//! assert!(limiter.try_acquire(Some("alice"), now).await);
//! # }
//! ```

pub mod error;
pub mod limiter;
pub mod store;
pub mod window;

pub use error::{RateLimitExceeded, StoreError};
pub use limiter::AdmissionLimiter;
pub use store::{CounterStore, InMemoryCounterStore};
pub use window::{RateScope, RateWindow};
