//! Startup seeding of the credential pool.
//!
//! The deployment hands the service one configuration blob containing
//! `("user", "pass")` pairs. Seeding flushes the store, writes each
//! credential under its sha256 fingerprint, and produces the fingerprint
//! list the [`CandidatePool`](crate::CandidatePool) scans at selection
//! time.

use crate::credential::Credential;
use crate::error::Result;
use gatehouse_core::ExpiringStore;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// TTL of seeded credentials. The deployment re-seeds daily.
pub const CREDENTIAL_TTL: Duration = Duration::from_secs(86400);

/// Extracts `("user", "pass")` pairs from a configuration blob.
///
/// Scans for the literal `("` ... `", "` ... `")` shape; anything between
/// pairs is ignored. Matching is non-greedy, so a stray quote inside a
/// field ends that field.
pub fn parse_pairs(blob: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut rest = blob;

    while let Some(start) = rest.find("(\"") {
        rest = &rest[start + 2..];
        let Some(mid) = rest.find("\", \"") else {
            break;
        };
        let username = &rest[..mid];
        rest = &rest[mid + 4..];
        let Some(end) = rest.find("\")") else {
            break;
        };
        let password = &rest[..end];
        rest = &rest[end + 2..];
        pairs.push((username.to_owned(), password.to_owned()));
    }

    pairs
}

/// Flushes the store and seeds every credential in the blob.
///
/// Returns the fingerprints in input order, deduplicated: a pair hashing
/// to an already-seeded fingerprint is skipped.
pub async fn seed_candidates<S: ExpiringStore>(store: &S, blob: &str) -> Result<Vec<String>> {
    store.flush_all().await?;

    let mut fingerprints = Vec::new();
    for (username, password) in parse_pairs(blob) {
        let credential = Credential { username, password };
        let fingerprint = credential.fingerprint();

        if store.get(&fingerprint).await?.is_some() {
            debug!(fingerprint, "fingerprint already seeded, skipping");
            continue;
        }

        store
            .set(&fingerprint, &credential.to_json()?, CREDENTIAL_TTL)
            .await?;
        debug!(username = %credential.username, fingerprint, "credential seeded");
        fingerprints.push(fingerprint);
    }

    info!(seeded = fingerprints.len(), "credential pool seeded");
    Ok(fingerprints)
}

/// Writes the fingerprint list to the candidate file, one per line.
///
/// The file is written in a single pass once seeding finishes, replacing
/// any previous content.
pub async fn write_candidate_file(path: impl AsRef<Path>, fingerprints: &[String]) -> Result<()> {
    let mut contents = fingerprints.join("\n");
    contents.push('\n');
    tokio::fs::write(path.as_ref(), contents).await?;
    Ok(())
}
