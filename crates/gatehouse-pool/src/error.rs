//! Error types for pool and limiter operations.

use gatehouse_core::StoreError;

/// Errors from pool and limiter operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("call budget exhausted for the current window")]
    TooManyRequests,

    #[error("candidate pool exhausted: {0}")]
    Exhausted(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid candidate data: {0}")]
    InvalidData(String),

    #[error("limiter state lock is poisoned")]
    StatePoisoned,

    #[error("failed to read candidate file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for pool and limiter operations.
pub type Result<T> = std::result::Result<T, Error>;
