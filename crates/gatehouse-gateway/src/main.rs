use clap::Parser;
use gatehouse_challenge::ChallengeRegistry;
use gatehouse_core::ExpiringStore;
use gatehouse_gateway::{App, AppState, Cli, JumpSettings};
use gatehouse_pool::{seed_candidates, write_candidate_file, CallLimiter, CandidatePool, LimiterSettings};
use gatehouse_store::heartbeat::DEFAULT_HEARTBEAT_INTERVAL;
use gatehouse_store::{spawn_heartbeat_task, MemoryStore, RedisStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Cli::try_parse()?;

    match config.redis_url.clone() {
        Some(url) => {
            let store = RedisStore::connect(&url).await?;
            run(store, config).await
        }
        None => {
            warn!("no redis url configured, falling back to the in-memory store");
            run(MemoryStore::new(), config).await
        }
    }
}

async fn run<S: ExpiringStore>(store: S, config: Cli) -> anyhow::Result<()> {
    let store = Arc::new(store);

    if let Some(blob) = &config.seed_users {
        let fingerprints = seed_candidates(store.as_ref(), blob).await?;
        write_candidate_file(&config.candidate_file, &fingerprints).await?;
    }

    let pool = if tokio::fs::try_exists(&config.candidate_file).await? {
        CandidatePool::load(Arc::clone(&store), &config.candidate_file).await?
    } else {
        warn!(candidate_file = %config.candidate_file.display(), "candidate file missing, jump pool starts empty");
        CandidatePool::new(Arc::clone(&store), Vec::new())
    };

    let registry = ChallengeRegistry::new(Arc::clone(&store));
    let limiter = Arc::new(CallLimiter::new(LimiterSettings::default()));
    let heartbeat = spawn_heartbeat_task(Arc::clone(&store), DEFAULT_HEARTBEAT_INTERVAL);

    let state = AppState::new(
        registry,
        Arc::new(pool),
        limiter,
        reqwest::Client::new(),
        JumpSettings {
            node_url_template: config.node_url_template.clone(),
            cookie_domain: config.cookie_domain.clone(),
        },
        config.allowed_origins.clone(),
    );
    let app = App::router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "starting gatehouse gateway");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    heartbeat.abort();
    Ok(())
}
