//! # SwapGate Validation
//!
//! Pure checks on swap requests: input amounts, slippage floors, price-impact caps,
//! token pairs, deadlines, pool-relative trade size and idempotency keys.
//!
//! Every check returns `Result<(), ValidationError>` and touches no state, so the
//! validator can be shared freely across tasks.

pub mod error;
pub mod validator;

pub use error::{ValidationError, ValidationErrorKind};
pub use validator::RequestValidator;
