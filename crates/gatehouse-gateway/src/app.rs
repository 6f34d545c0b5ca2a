use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use gatehouse_core::ExpiringStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::challenge::{
    challenge_page_handler, challenge_status_handler, create_challenge_handler,
    resolve_challenge_handler,
};
use crate::handlers::health::health_handler;
use crate::handlers::jump::jump_handler;
use crate::middleware::{require_fresh_timestamp, TIMESTAMP_HEADER};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router<S: ExpiringStore>(state: AppState<S>) -> Router {
        let cors = cors_layer(state.allowed_origins());
        Router::new()
            .route("/health", get(health_handler))
            .route("/challenge/request", post(create_challenge_handler::<S>))
            .route("/challenge/process", get(challenge_page_handler::<S>))
            .route(
                "/challenge/request/get_url",
                get(resolve_challenge_handler::<S>),
            )
            .route("/challenge/status", post(challenge_status_handler::<S>))
            .route("/jump", post(jump_handler::<S>))
            .layer(axum::middleware::from_fn(require_fresh_timestamp))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(TIMESTAMP_HEADER),
        ])
        .allow_credentials(true)
}
