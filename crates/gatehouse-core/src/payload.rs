use crate::error::ChallengeError;
use serde::{Deserialize, Serialize};

/// The stored body of a challenge: where to send the caller once the
/// challenge completes, and what to show on the interstitial meanwhile.
///
/// Payloads are single-redemption: the registry deletes the entry when the
/// target URL is handed out, so a resolved token cannot be replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengePayload {
    /// The URL the caller is ultimately redirected to.
    pub target_url: String,
    /// Error code shown on the interstitial page.
    pub error_code: u16,
    /// Human-readable reason shown on the interstitial page.
    pub error_reason: String,
}

impl ChallengePayload {
    /// Serializes the payload to its stored JSON form.
    pub fn to_json(&self) -> Result<String, ChallengeError> {
        serde_json::to_string(self)
            .map_err(|e| ChallengeError::InvalidData(format!("failed to serialize payload: {e}")))
    }

    /// Deserializes a payload from its stored JSON form.
    pub fn from_json(raw: &str) -> Result<Self, ChallengeError> {
        serde_json::from_str(raw)
            .map_err(|e| ChallengeError::InvalidData(format!("invalid stored payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_is_json() {
        let payload = ChallengePayload {
            target_url: "https://example.com".to_string(),
            error_code: 429,
            error_reason: "rate limited".to_string(),
        };

        let json = payload.to_json().unwrap();
        assert!(json.contains("\"target_url\""));
        assert_eq!(ChallengePayload::from_json(&json).unwrap(), payload);
    }

    #[test]
    fn garbage_is_invalid_data() {
        let err = ChallengePayload::from_json("not json").unwrap_err();
        assert!(matches!(err, ChallengeError::InvalidData(_)));
    }
}
