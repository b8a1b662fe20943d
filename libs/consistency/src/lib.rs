//! # SwapGate Consistency
//!
//! Bridges an eventually-consistent read path after a ledger write: poll a snapshot
//! supplier until it reflects the write, backing off exponentially with jitter, within
//! a hard deadline and subject to cancellation.
//!
//! Only reads are retried here. A timeout does not mean the write failed; callers must
//! treat it as indeterminate.

pub mod backoff;
pub mod cancel;
pub mod error;
pub mod poller;

pub use backoff::Backoff;
pub use cancel::{cancellation_pair, CancellationSignal, Canceller};
pub use error::ConsistencyError;
pub use poller::ConsistencyPoller;
