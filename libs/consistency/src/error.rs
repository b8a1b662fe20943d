//! Poll failure types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("Timed out waiting for {description} after {attempts} attempts ({elapsed_ms}ms)")]
    Timeout {
        description: String,
        attempts: u32,
        elapsed_ms: u64,
    },

    #[error("Cancelled waiting for {description} after {attempts} attempts")]
    Cancelled { description: String, attempts: u32 },
}

impl ConsistencyError {
    /// A timeout may succeed on a later read; cancellation was the caller's choice
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConsistencyError::Timeout { .. })
    }

    /// The write being waited on may or may not have landed
    ///
    /// Holds for every variant: giving up on the read path says nothing about the write.
    pub fn is_indeterminate(&self) -> bool {
        true
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ConsistencyError::Timeout { attempts, .. }
            | ConsistencyError::Cancelled { attempts, .. } => *attempts,
        }
    }
}
