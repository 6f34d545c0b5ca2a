use crate::deriver;
use gatehouse_core::{
    ChallengeError, ChallengePayload, ChallengeStatus, ChallengeToken, ExpiringStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, ChallengeError>;

/// Payload entries live long enough for the client to sit through the
/// interstitial and re-poll, no longer.
pub const DEFAULT_PAYLOAD_TTL: Duration = Duration::from_secs(300);

/// Status entries outlive the payload so late status polls still get an
/// answer after resolution.
pub const DEFAULT_STATUS_TTL: Duration = Duration::from_secs(1800);

/// Interstitial error code when the caller supplies none.
pub const DEFAULT_ERROR_CODE: u16 = 429;

/// Interstitial reason when the caller supplies none.
pub const DEFAULT_ERROR_REASON: &str = "rate limited";

/// Parameters for issuing a challenge.
#[derive(Debug, Clone, TypedBuilder)]
pub struct CreateParams {
    /// Where the caller is redirected once the challenge completes.
    #[builder(setter(into))]
    pub target_url: String,
    /// Error code shown on the interstitial page.
    #[builder(default = DEFAULT_ERROR_CODE)]
    pub error_code: u16,
    /// Reason shown on the interstitial page.
    #[builder(default = String::from(DEFAULT_ERROR_REASON), setter(into))]
    pub error_reason: String,
}

/// Outcome of [`ChallengeRegistry::create`].
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// A challenge was issued; the caller should poll with this token.
    Issued(ChallengeToken),
    /// The store was unreachable, so no challenge state exists; the caller
    /// should redirect straight to this URL. Availability is preferred over
    /// the challenge mechanism here.
    DirectRedirect(String),
}

/// The challenge state machine, built on a shared [`ExpiringStore`].
///
/// Each challenge is two store entries sharing a token: the payload
/// (single-redemption, short TTL) and the status (longer TTL, reset on
/// every transition). Expiry is the only deletion mechanism besides the
/// one-time payload deletion on success.
#[derive(Debug)]
pub struct ChallengeRegistry<S> {
    store: Arc<S>,
    payload_ttl: Duration,
    status_ttl: Duration,
}

// Manual impl: cloning shares the store, so `S` itself does not need to
// be `Clone`.
impl<S> Clone for ChallengeRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            payload_ttl: self.payload_ttl,
            status_ttl: self.status_ttl,
        }
    }
}

impl<S: ExpiringStore> ChallengeRegistry<S> {
    /// Creates a registry with the default TTLs.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_ttls(store, DEFAULT_PAYLOAD_TTL, DEFAULT_STATUS_TTL)
    }

    /// Creates a registry with custom payload and status TTLs.
    pub fn with_ttls(store: Arc<S>, payload_ttl: Duration, status_ttl: Duration) -> Self {
        Self {
            store,
            payload_ttl,
            status_ttl,
        }
    }

    /// Issues a challenge for the given client fingerprint and target URL.
    ///
    /// The token is derived deterministically from the fingerprint and the
    /// normalized URL; payload and pending status are written with their
    /// TTLs. When the store is unreachable the caller gets
    /// [`CreateOutcome::DirectRedirect`] instead of an error.
    pub async fn create(&self, client_fingerprint: &str, params: CreateParams) -> Result<CreateOutcome> {
        if params.target_url.is_empty() {
            return Err(ChallengeError::Unacceptable(
                "target url must not be empty".to_string(),
            ));
        }

        let target_url = normalize_target_url(&params.target_url);
        let token = deriver::derive(client_fingerprint, &target_url);
        trace!(token = %token, url = %target_url, "issuing challenge");

        let payload = ChallengePayload {
            target_url: target_url.clone(),
            error_code: params.error_code,
            error_reason: params.error_reason,
        };
        let json = payload.to_json()?;

        if let Err(e) = self
            .store
            .set(token.payload_key(), &json, self.payload_ttl)
            .await
        {
            if e.is_unavailable() {
                warn!(error = %e, "store unavailable, degrading to direct redirect");
                return Ok(CreateOutcome::DirectRedirect(target_url));
            }
            return Err(e.into());
        }

        if let Err(e) = self
            .store
            .set(
                &token.status_key(),
                ChallengeStatus::Pending.as_str(),
                self.status_ttl,
            )
            .await
        {
            if e.is_unavailable() {
                warn!(error = %e, "store lost mid-create, degrading to direct redirect");
                return Ok(CreateOutcome::DirectRedirect(target_url));
            }
            return Err(e.into());
        }

        debug!(token = %token, "challenge issued");
        Ok(CreateOutcome::Issued(token))
    }

    /// Marks the challenge as processing and returns its payload for
    /// interstitial rendering.
    ///
    /// Idempotent: re-invoking while already processing just re-extends the
    /// status TTL. Fails with `NotFound` when the payload is absent, which
    /// covers both unknown and expired tokens.
    pub async fn begin_processing(&self, token: &ChallengeToken) -> Result<ChallengePayload> {
        let raw = self.store.get(token.payload_key()).await?;
        let Some(raw) = raw else {
            trace!(token = %token, "no payload for token");
            return Err(ChallengeError::NotFound);
        };
        let payload = ChallengePayload::from_json(&raw)?;

        self.store
            .set(
                &token.status_key(),
                ChallengeStatus::Processing.as_str(),
                self.status_ttl,
            )
            .await?;

        debug!(token = %token, "challenge processing");
        Ok(payload)
    }

    /// Redeems the challenge, returning the target URL exactly once.
    ///
    /// The payload is consumed atomically; concurrent resolves race inside
    /// the store and at most one observes the payload. A second resolve
    /// fails with `NotFound`, signaling the caller to fall back to a
    /// referrer redirect.
    pub async fn resolve(&self, token: &ChallengeToken) -> Result<String> {
        let raw = self.store.get_del(token.payload_key()).await?;
        let Some(raw) = raw else {
            trace!(token = %token, "payload absent or already redeemed");
            return Err(ChallengeError::NotFound);
        };
        let payload = ChallengePayload::from_json(&raw)?;

        self.store
            .set(
                &token.status_key(),
                ChallengeStatus::Success.as_str(),
                self.status_ttl,
            )
            .await?;

        debug!(token = %token, url = %payload.target_url, "challenge resolved");
        Ok(payload.target_url)
    }

    /// Answers a status query.
    ///
    /// An absent status entry is `Unknown`, not an error; only an
    /// unreachable store is reported as `Unavailable`. The two must not be
    /// conflated.
    pub async fn status(&self, token: &ChallengeToken) -> Result<ChallengeStatus> {
        match self.store.get(&token.status_key()).await {
            Ok(Some(raw)) => Ok(ChallengeStatus::parse(&raw)),
            Ok(None) => Ok(ChallengeStatus::Unknown),
            Err(e) => Err(e.into()),
        }
    }

    /// Marks the challenge as failed.
    ///
    /// The registry itself never produces `fail`; this entry point exists
    /// for external abuse signals. `fail` is terminal until TTL expiry.
    pub async fn mark_failed(&self, token: &ChallengeToken) -> Result<()> {
        self.store
            .set(
                &token.status_key(),
                ChallengeStatus::Fail.as_str(),
                self.status_ttl,
            )
            .await?;
        debug!(token = %token, "challenge marked failed");
        Ok(())
    }
}

/// Prepends `https://` when the URL carries no scheme.
fn normalize_target_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gatehouse_core::store::Result as StoreResult;
    use gatehouse_core::StoreError;
    use gatehouse_store::MemoryStore;

    const FINGERPRINT: &str = "203.0.113.7";

    fn registry() -> ChallengeRegistry<MemoryStore> {
        ChallengeRegistry::new(Arc::new(MemoryStore::new()))
    }

    fn params(url: &str) -> CreateParams {
        CreateParams::builder().target_url(url).build()
    }

    async fn issue(registry: &ChallengeRegistry<MemoryStore>, url: &str) -> ChallengeToken {
        match registry.create(FINGERPRINT, params(url)).await.unwrap() {
            CreateOutcome::Issued(token) => token,
            CreateOutcome::DirectRedirect(url) => panic!("unexpected degraded create: {url}"),
        }
    }

    #[tokio::test]
    async fn create_starts_pending() {
        let registry = registry();
        let token = issue(&registry, "https://example.com").await;

        let status = registry.status(&token).await.unwrap();
        assert_eq!(status, ChallengeStatus::Pending);
    }

    #[tokio::test]
    async fn create_defaults_code_and_reason() {
        let registry = registry();
        let token = issue(&registry, "https://example.com").await;

        let payload = registry.begin_processing(&token).await.unwrap();
        assert_eq!(payload.error_code, 429);
        assert_eq!(payload.error_reason, "rate limited");
    }

    #[tokio::test]
    async fn create_rejects_empty_url() {
        let registry = registry();
        let err = registry.create(FINGERPRINT, params("")).await.unwrap_err();
        assert!(matches!(err, ChallengeError::Unacceptable(_)));
    }

    #[tokio::test]
    async fn bare_host_is_normalized_to_https() {
        let registry = registry();
        let token = issue(&registry, "example.com").await;

        let payload = registry.begin_processing(&token).await.unwrap();
        assert_eq!(payload.target_url, "https://example.com");
    }

    #[tokio::test]
    async fn schemed_url_is_stored_unchanged() {
        let registry = registry();
        let token = issue(&registry, "http://plain.example.com").await;

        let payload = registry.begin_processing(&token).await.unwrap();
        assert_eq!(payload.target_url, "http://plain.example.com");
    }

    #[tokio::test]
    async fn begin_processing_transitions_status() {
        let registry = registry();
        let token = issue(&registry, "https://example.com").await;

        registry.begin_processing(&token).await.unwrap();
        assert_eq!(
            registry.status(&token).await.unwrap(),
            ChallengeStatus::Processing
        );
    }

    #[tokio::test]
    async fn begin_processing_is_idempotent() {
        let registry = registry();
        let token = issue(&registry, "https://example.com").await;

        let first = registry.begin_processing(&token).await.unwrap();
        let second = registry.begin_processing(&token).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            registry.status(&token).await.unwrap(),
            ChallengeStatus::Processing
        );
    }

    #[tokio::test]
    async fn begin_processing_unknown_token_is_not_found() {
        let registry = registry();
        let token = ChallengeToken::new_unchecked("never-issued");

        let err = registry.begin_processing(&token).await.unwrap_err();
        assert!(matches!(err, ChallengeError::NotFound));
    }

    #[tokio::test]
    async fn resolve_redeems_exactly_once() {
        let registry = registry();
        let token = issue(&registry, "https://example.com").await;
        registry.begin_processing(&token).await.unwrap();

        let url = registry.resolve(&token).await.unwrap();
        assert_eq!(url, "https://example.com");
        assert_eq!(
            registry.status(&token).await.unwrap(),
            ChallengeStatus::Success
        );

        let err = registry.resolve(&token).await.unwrap_err();
        assert!(matches!(err, ChallengeError::NotFound));
    }

    #[tokio::test]
    async fn resolve_unknown_token_is_not_found() {
        let registry = registry();
        let token = ChallengeToken::new_unchecked("never-issued");

        let err = registry.resolve(&token).await.unwrap_err();
        assert!(matches!(err, ChallengeError::NotFound));
    }

    #[tokio::test]
    async fn status_of_unknown_token_is_unknown() {
        let registry = registry();
        let token = ChallengeToken::new_unchecked("never-issued");

        let status = registry.status(&token).await.unwrap();
        assert_eq!(status, ChallengeStatus::Unknown);
    }

    #[tokio::test]
    async fn mark_failed_is_reported_by_status() {
        let registry = registry();
        let token = issue(&registry, "https://example.com").await;

        registry.mark_failed(&token).await.unwrap();
        assert_eq!(registry.status(&token).await.unwrap(), ChallengeStatus::Fail);
    }

    #[tokio::test]
    async fn same_inputs_reuse_the_same_token() {
        let registry = registry();
        let first = issue(&registry, "https://example.com").await;
        let second = issue(&registry, "https://example.com").await;
        assert_eq!(first, second);
    }

    /// Store stub that is always unreachable.
    struct DownStore;

    #[async_trait]
    impl ExpiringStore for DownStore {
        async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> StoreResult<()> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn get_del(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn delete(&self, _key: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn exists(&self, _key: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn flush_all(&self) -> StoreResult<()> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn create_degrades_to_direct_redirect_when_store_is_down() {
        let registry = ChallengeRegistry::new(Arc::new(DownStore));

        let outcome = registry
            .create(FINGERPRINT, params("example.com"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CreateOutcome::DirectRedirect("https://example.com".to_string())
        );
    }

    #[tokio::test]
    async fn status_reports_unavailable_when_store_is_down() {
        let registry = ChallengeRegistry::new(Arc::new(DownStore));
        let token = ChallengeToken::new_unchecked("any");

        let err = registry.status(&token).await.unwrap_err();
        assert!(matches!(err, ChallengeError::Unavailable(_)));
    }
}
