use std::fmt::Display;

/// Lifecycle status of a challenge.
///
/// Transitions:
/// - Pending → Processing (interstitial served)
/// - Processing → Success (target URL redeemed)
/// - any → Fail (set by an external abuse signal, never by the registry)
///
/// `Success` and `Fail` are terminal; TTL expiry is the only way out of
/// them. `Unknown` is never stored — it is the answer for an absent or
/// unrecognized status entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeStatus {
    Pending,
    Processing,
    Success,
    Fail,
    Unknown,
}

impl ChallengeStatus {
    /// The stored string form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Pending => "pending",
            ChallengeStatus::Processing => "processing",
            ChallengeStatus::Success => "success",
            ChallengeStatus::Fail => "fail",
            ChallengeStatus::Unknown => "unknown",
        }
    }

    /// Parses a stored status string.
    ///
    /// Unrecognized values map to `Unknown` rather than failing: a store
    /// entry written by an old or foreign writer should not break status
    /// queries.
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => ChallengeStatus::Pending,
            "processing" => ChallengeStatus::Processing,
            "success" => ChallengeStatus::Success,
            "fail" => ChallengeStatus::Fail,
            _ => ChallengeStatus::Unknown,
        }
    }

    /// Whether no further transition may leave this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChallengeStatus::Success | ChallengeStatus::Fail)
    }
}

impl Display for ChallengeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_statuses() {
        assert_eq!(ChallengeStatus::parse("pending"), ChallengeStatus::Pending);
        assert_eq!(
            ChallengeStatus::parse("processing"),
            ChallengeStatus::Processing
        );
        assert_eq!(ChallengeStatus::parse("success"), ChallengeStatus::Success);
        assert_eq!(ChallengeStatus::parse("fail"), ChallengeStatus::Fail);
    }

    #[test]
    fn parse_unrecognized_is_unknown() {
        assert_eq!(ChallengeStatus::parse("done"), ChallengeStatus::Unknown);
        assert_eq!(ChallengeStatus::parse(""), ChallengeStatus::Unknown);
    }

    #[test]
    fn terminal_statuses() {
        assert!(ChallengeStatus::Success.is_terminal());
        assert!(ChallengeStatus::Fail.is_terminal());
        assert!(!ChallengeStatus::Pending.is_terminal());
        assert!(!ChallengeStatus::Processing.is_terminal());
        assert!(!ChallengeStatus::Unknown.is_terminal());
    }
}
