use crate::error::ChallengeError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Reserved suffix for status keys. Payload keys are bare tokens, so the
/// suffix keeps the two key spaces disjoint by construction.
const STATUS_SUFFIX: &str = "_status";

/// An opaque challenge token correlating a pending redirect with its
/// stored payload and status entries.
///
/// Tokens are derived deterministically from a client fingerprint and a
/// target URL (see the deriver in `gatehouse-challenge`); this type only
/// enforces that a token is usable as a store key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeToken(String);

impl ChallengeToken {
    /// Creates a `ChallengeToken` after validating the input.
    ///
    /// Valid tokens are non-empty and contain no whitespace or control
    /// characters.
    pub fn new(token: impl Into<String>) -> Result<Self, ChallengeError> {
        let token = token.into();
        Self::validate(&token)?;
        Ok(Self(token))
    }

    /// Creates a `ChallengeToken` without validation.
    ///
    /// Use this only for tokens produced by trusted internal sources
    /// (e.g. the deriver, which is guaranteed to produce valid output).
    pub fn new_unchecked(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The store key holding the challenge payload.
    pub fn payload_key(&self) -> &str {
        &self.0
    }

    /// The store key holding the challenge status.
    pub fn status_key(&self) -> String {
        format!("{}{}", self.0, STATUS_SUFFIX)
    }

    fn validate(token: &str) -> Result<(), ChallengeError> {
        if token.is_empty() {
            return Err(ChallengeError::Unacceptable(
                "challenge token must not be empty".to_string(),
            ));
        }

        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ChallengeError::Unacceptable(format!(
                "challenge token must not contain whitespace or control characters: '{}'",
                token
            )));
        }

        Ok(())
    }
}

impl Display for ChallengeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_tokens() {
        assert!(ChallengeToken::new("a1b2c3").is_ok());
        assert!(ChallengeToken::new("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }

    #[test]
    fn empty_token_is_unacceptable() {
        let err = ChallengeToken::new("").unwrap_err();
        assert!(matches!(err, ChallengeError::Unacceptable(_)));
    }

    #[test]
    fn whitespace_is_unacceptable() {
        assert!(ChallengeToken::new("abc def").is_err());
        assert!(ChallengeToken::new("abc\n").is_err());
    }

    #[test]
    fn status_key_uses_reserved_suffix() {
        let token = ChallengeToken::new("abc123").unwrap();
        assert_eq!(token.payload_key(), "abc123");
        assert_eq!(token.status_key(), "abc123_status");
    }
}
