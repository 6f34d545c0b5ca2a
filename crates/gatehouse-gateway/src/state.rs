use gatehouse_challenge::ChallengeRegistry;
use gatehouse_pool::{CallLimiter, CandidatePool};
use std::sync::Arc;

/// Settings for the jump/login flow.
#[derive(Debug, Clone)]
pub struct JumpSettings {
    /// Node base URL template; `{n}` is replaced by the node index.
    pub node_url_template: String,
    /// Domain attribute for the relayed access-token cookie, if any.
    pub cookie_domain: Option<String>,
}

/// Shared state behind every handler.
pub struct AppState<S> {
    registry: ChallengeRegistry<S>,
    pool: Arc<CandidatePool<S>>,
    limiter: Arc<CallLimiter>,
    http: reqwest::Client,
    jump: Arc<JumpSettings>,
    allowed_origins: Vec<String>,
}

impl<S> AppState<S> {
    pub fn new(
        registry: ChallengeRegistry<S>,
        pool: Arc<CandidatePool<S>>,
        limiter: Arc<CallLimiter>,
        http: reqwest::Client,
        jump: JumpSettings,
        allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            registry,
            pool,
            limiter,
            http,
            jump: Arc::new(jump),
            allowed_origins,
        }
    }

    pub fn registry(&self) -> &ChallengeRegistry<S> {
        &self.registry
    }

    pub fn pool(&self) -> &CandidatePool<S> {
        &self.pool
    }

    pub fn limiter(&self) -> &CallLimiter {
        &self.limiter
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn jump(&self) -> &JumpSettings {
        &self.jump
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}

// Manual impl: `S` itself does not need to be `Clone`, only the `Arc`s
// holding it.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            pool: Arc::clone(&self.pool),
            limiter: Arc::clone(&self.limiter),
            http: self.http.clone(),
            jump: Arc::clone(&self.jump),
            allowed_origins: self.allowed_origins.clone(),
        }
    }
}
