//! # SwapGate
//!
//! Request pipeline that decides whether a swap may proceed and what price it gets,
//! before any ledger mutation is attempted.
//!
//! ## Flow
//!
//! 1. [`RequestValidator`](swapgate_validation::RequestValidator) checks static rules
//! 2. [`AdmissionLimiter`](swapgate_admission::AdmissionLimiter) grants or denies a slot
//! 3. The pool snapshot is read and oriented, and the trade size is checked against it
//! 4. [`PricingEngine`](swapgate_amm::PricingEngine) quotes; the quote must honour the
//!    client's impact cap and output floor
//! 5. After the external ledger write, [`ConsistencyPoller`](swapgate_consistency::ConsistencyPoller)
//!    waits for the read path to reflect it
//!
//! Ledger submissions are spaced by a [`SubmissionPacer`], and replayed requests are
//! answered from the [`IdempotencyCache`].

pub mod error;
pub mod idempotency;
pub mod pacer;
pub mod pipeline;

pub use error::{GateError, Result};
pub use idempotency::{body_hash, IdempotencyCache, IdempotencyError};
pub use pacer::SubmissionPacer;
pub use pipeline::{AdmittedSwap, SwapGate};
