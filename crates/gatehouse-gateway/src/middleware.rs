//! Request-freshness middleware.
//!
//! Mutating endpoints require an `X-Timestamp` header no older than
//! [`MAX_TIMESTAMP_AGE_SECS`]; stale or missing timestamps are rejected
//! with 403. The challenge polling pages are exempt — their tokens are
//! validated by the registry instead — as are the root and health paths.

use crate::error::message_body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use jiff::Timestamp;
use tracing::debug;

/// Header carrying the caller's unix-second timestamp.
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Maximum accepted age of a request timestamp.
pub const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

fn is_exempt(path: &str) -> bool {
    path == "/"
        || path == "/health"
        || path.starts_with("/static")
        || path == "/challenge/process"
        || path == "/challenge/request/get_url"
}

pub async fn require_fresh_timestamp(request: Request, next: Next) -> Response {
    if is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let timestamp = request
        .headers()
        .get(TIMESTAMP_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok());

    let Some(timestamp) = timestamp else {
        debug!(path = request.uri().path(), "missing or unparseable request timestamp");
        return message_body(StatusCode::FORBIDDEN, "Expired");
    };

    let now = Timestamp::now().as_second();
    if now - timestamp > MAX_TIMESTAMP_AGE_SECS {
        debug!(
            path = request.uri().path(),
            age_secs = now - timestamp,
            "stale request timestamp"
        );
        return message_body(StatusCode::FORBIDDEN, "Forbidden");
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_polling_paths_are_exempt() {
        assert!(is_exempt("/"));
        assert!(is_exempt("/health"));
        assert!(is_exempt("/static/app.js"));
        assert!(is_exempt("/challenge/process"));
        assert!(is_exempt("/challenge/request/get_url"));
    }

    #[test]
    fn mutating_paths_are_checked() {
        assert!(!is_exempt("/challenge/request"));
        assert!(!is_exempt("/challenge/status"));
        assert!(!is_exempt("/jump"));
    }
}
