use crate::error::Error;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A pooled login credential, stored as JSON under its fingerprint key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    /// The sha256 hex fingerprint identifying this credential in the pool.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(format!("{}{}", self.username, self.password));
        format!("{digest:x}")
    }

    /// Serializes the credential to its stored JSON form.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self)
            .map_err(|e| Error::InvalidData(format!("failed to serialize credential: {e}")))
    }

    /// Deserializes a credential from its stored JSON form.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw)
            .map_err(|e| Error::InvalidData(format!("invalid stored credential: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        let fp = credential().fingerprint();
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        // Stable across calls.
        assert_eq!(fp, credential().fingerprint());
    }

    #[test]
    fn fingerprint_depends_on_both_fields() {
        let mut other = credential();
        other.password = "hunter3".to_string();
        assert_ne!(credential().fingerprint(), other.fingerprint());
    }

    #[test]
    fn stored_form_round_trips() {
        let json = credential().to_json().unwrap();
        assert_eq!(Credential::from_json(&json).unwrap(), credential());
    }

    #[test]
    fn garbage_is_invalid_data() {
        assert!(matches!(
            Credential::from_json("{").unwrap_err(),
            Error::InvalidData(_)
        ));
    }
}
