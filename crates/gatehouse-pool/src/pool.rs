use crate::credential::Credential;
use crate::error::{Error, Result};
use gatehouse_core::ExpiringStore;
use rand::seq::SliceRandom;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Reservation keys share the `_status` suffix convention of challenge
/// status keys; fingerprints and challenge tokens never collide because
/// fingerprints are fixed-width hex and tokens are UUID-shaped.
const RESERVATION_SUFFIX: &str = "_status";

/// Value written when a candidate is claimed.
const RESERVATION_VALUE: &str = "pending";

/// How long a claim on a candidate lasts before it frees itself.
pub const DEFAULT_RESERVATION_TTL: Duration = Duration::from_secs(3600);

/// A fixed pool of credential fingerprints with claim-by-reservation.
///
/// The store is the source of truth for credential data and reservations;
/// the pool only carries the candidate list. Selection scans a shuffled
/// copy of the list (bounded by pool size, no recursion), skips anything
/// malformed, reserved, or missing from the store, and claims the first
/// free candidate for [`DEFAULT_RESERVATION_TTL`].
pub struct CandidatePool<S> {
    store: Arc<S>,
    candidates: Vec<String>,
    reservation_ttl: Duration,
}

impl<S: ExpiringStore> CandidatePool<S> {
    /// Creates a pool over the given candidate fingerprints.
    pub fn new(store: Arc<S>, candidates: Vec<String>) -> Self {
        info!(candidates = candidates.len(), "candidate pool initialized");
        Self {
            store,
            candidates,
            reservation_ttl: DEFAULT_RESERVATION_TTL,
        }
    }

    /// Creates a pool with a custom reservation TTL.
    pub fn with_reservation_ttl(
        store: Arc<S>,
        candidates: Vec<String>,
        reservation_ttl: Duration,
    ) -> Self {
        let mut pool = Self::new(store, candidates);
        pool.reservation_ttl = reservation_ttl;
        pool
    }

    /// Loads the candidate list from a line-delimited fingerprint file.
    pub async fn load(store: Arc<S>, path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let candidates = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(Self::new(store, candidates))
    }

    /// Number of candidates in the pool, reserved or not.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the pool has no candidates at all.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Claims a free candidate and returns its credential.
    ///
    /// Fails with `Exhausted` once every candidate has been scanned without
    /// a claim. Candidates are visited in random order so concurrent
    /// selectors spread across the pool instead of contending on the head.
    pub async fn select_free(&self) -> Result<Credential> {
        let mut order: Vec<&str> = self.candidates.iter().map(String::as_str).collect();
        order.shuffle(&mut rand::rng());

        for fingerprint in order {
            if !is_well_formed(fingerprint) {
                debug!(fingerprint, "skipping malformed candidate");
                continue;
            }

            if self.store.exists(&reservation_key(fingerprint)).await? {
                trace!(fingerprint, "candidate already reserved");
                continue;
            }

            let Some(raw) = self.store.get(fingerprint).await? else {
                debug!(fingerprint, "candidate has no stored credential");
                continue;
            };

            let credential = match Credential::from_json(&raw) {
                Ok(credential) => credential,
                Err(e) => {
                    warn!(fingerprint, error = %e, "skipping candidate with unparseable credential");
                    continue;
                }
            };

            self.store
                .set(
                    &reservation_key(fingerprint),
                    RESERVATION_VALUE,
                    self.reservation_ttl,
                )
                .await?;
            debug!(fingerprint, "candidate claimed");
            return Ok(credential);
        }

        Err(Error::Exhausted(format!(
            "all {} candidates reserved or unusable",
            self.candidates.len()
        )))
    }
}

/// Candidate fingerprints are sha256 hex digests: 64 hex characters.
fn is_well_formed(fingerprint: &str) -> bool {
    fingerprint.len() == 64 && fingerprint.chars().all(|c| c.is_ascii_hexdigit())
}

fn reservation_key(fingerprint: &str) -> String {
    format!("{fingerprint}{RESERVATION_SUFFIX}")
}
