use thiserror::Error;

/// Errors returned by [`ExpiringStore`](crate::ExpiringStore) implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out: {0}")]
    Timeout(String),
    #[error("stored value is invalid: {0}")]
    InvalidData(String),
    #[error("store operation failed: {0}")]
    Operation(String),
}

impl StoreError {
    /// Whether the backend could not be reached at all.
    ///
    /// Timeouts are treated as unavailability: store calls carry a short
    /// fail-fast timeout, and a slow backend is indistinguishable from a
    /// dead one to the caller.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

/// Errors returned by the challenge registry.
///
/// `NotFound` covers both never-issued and expired tokens; callers must not
/// be able to tell the two apart. `Unavailable` is distinct from `NotFound`:
/// a missing key is an answer, an unreachable store is not.
#[derive(Debug, Clone, Error)]
pub enum ChallengeError {
    #[error("unacceptable input: {0}")]
    Unacceptable(String),
    #[error("challenge not found")]
    NotFound,
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("stored challenge data is invalid: {0}")]
    InvalidData(String),
}

impl From<StoreError> for ChallengeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) | StoreError::Timeout(msg) => {
                ChallengeError::Unavailable(msg)
            }
            StoreError::InvalidData(msg) => ChallengeError::InvalidData(msg),
            StoreError::Operation(msg) => ChallengeError::Unavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_counts_as_unavailable() {
        assert!(StoreError::Timeout("deadline".into()).is_unavailable());
        assert!(StoreError::Unavailable("refused".into()).is_unavailable());
        assert!(!StoreError::InvalidData("garbage".into()).is_unavailable());
    }

    #[test]
    fn store_errors_map_to_challenge_errors() {
        let e: ChallengeError = StoreError::Timeout("deadline".into()).into();
        assert!(matches!(e, ChallengeError::Unavailable(_)));

        let e: ChallengeError = StoreError::InvalidData("garbage".into()).into();
        assert!(matches!(e, ChallengeError::InvalidData(_)));
    }
}
