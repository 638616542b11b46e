//! # Time Error Types
//!
//! All errors that can occur when registering timers and interpolators,
//! plus configuration loading.

use hourglass_core::PoolError;
use thiserror::Error;

/// Errors that can occur in the time system.
///
/// Creation either fully succeeds or fails with one of these. Once created,
/// an entry cannot fail: it completes or it is stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// A creation argument was out of range or missing.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// The offending parameter.
        name: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The engine's pool is full and no slot could be reused.
    #[error("pool exhausted: all {capacity} slots are live")]
    PoolExhausted {
        /// Fixed capacity of the pool.
        capacity: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<PoolError> for TimeError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Exhausted { capacity } => Self::PoolExhausted { capacity },
        }
    }
}

/// Result type for time operations.
pub type TimeResult<T> = Result<T, TimeError>;
