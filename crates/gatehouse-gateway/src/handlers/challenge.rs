use crate::error::Result;
use crate::model::{
    ChallengeQuery, CreateChallengeRequest, CreateChallengeResponse, StatusRequest, StatusResponse,
};
use crate::state::AppState;
use axum::extract::{ConnectInfo, FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use gatehouse_challenge::registry::{DEFAULT_ERROR_CODE, DEFAULT_ERROR_REASON};
use gatehouse_challenge::{CreateOutcome, CreateParams};
use gatehouse_core::{ChallengeError, ChallengePayload, ChallengeToken, ExpiringStore};
use std::convert::Infallible;
use std::net::SocketAddr;

const INTERSTITIAL_TEMPLATE: &str = include_str!("../../templates/challenge.html");

/// Extracts the requesting client's fingerprint from the request.
///
/// Prefers the first `X-Forwarded-For` hop (the service normally sits
/// behind a proxy), falling back to the peer address when the server was
/// started with connect info.
pub struct ClientFingerprint(pub String);

impl<S> FromRequestParts<S> for ClientFingerprint
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Infallible> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(client_fingerprint(&parts.headers, peer.as_ref())))
    }
}

pub async fn create_challenge_handler<S: ExpiringStore>(
    State(state): State<AppState<S>>,
    ClientFingerprint(fingerprint): ClientFingerprint,
    Json(request): Json<CreateChallengeRequest>,
) -> Result<Response> {
    // A caller that already holds a token goes straight to the process page.
    if let Some(challenge_id) = request.challenge_id.filter(|id| !id.is_empty()) {
        let location = format!("/challenge/process?challenge_id={challenge_id}");
        return Ok(Redirect::temporary(&location).into_response());
    }

    let redirect_url = request.redirect_url.unwrap_or_default();
    if redirect_url.is_empty() {
        return Err(ChallengeError::Unacceptable("redirect_url is required".to_string()).into());
    }

    let params = CreateParams::builder()
        .target_url(redirect_url)
        .error_code(request.code.unwrap_or(DEFAULT_ERROR_CODE))
        .error_reason(
            request
                .reason
                .unwrap_or_else(|| DEFAULT_ERROR_REASON.to_string()),
        )
        .build();

    match state.registry().create(&fingerprint, params).await? {
        CreateOutcome::Issued(token) => Ok((
            StatusCode::CREATED,
            Json(CreateChallengeResponse {
                challenge_id: token.to_string(),
            }),
        )
            .into_response()),
        CreateOutcome::DirectRedirect(url) => Ok(Redirect::temporary(&url).into_response()),
    }
}

pub async fn challenge_page_handler<S: ExpiringStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Response> {
    let Some(challenge_id) = query.challenge_id.filter(|id| !id.is_empty()) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let token = ChallengeToken::new(challenge_id)?;

    let payload = state.registry().begin_processing(&token).await?;
    Ok((StatusCode::ACCEPTED, Html(render_interstitial(&payload))).into_response())
}

pub async fn resolve_challenge_handler<S: ExpiringStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Query(query): Query<ChallengeQuery>,
) -> Result<Response> {
    let Some(challenge_id) = query.challenge_id.filter(|id| !id.is_empty()) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let token = ChallengeToken::new(challenge_id)?;

    match state.registry().resolve(&token).await {
        Ok(url) => Ok((StatusCode::OK, url).into_response()),
        Err(ChallengeError::NotFound) => {
            // Already redeemed or expired: bounce the caller back where it
            // came from rather than erroring.
            let referer = headers
                .get(header::REFERER)
                .and_then(|value| value.to_str().ok());
            match referer {
                Some(referer) => Ok(Redirect::temporary(referer).into_response()),
                None => Err(ChallengeError::NotFound.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn challenge_status_handler<S: ExpiringStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<StatusResponse>> {
    let token = ChallengeToken::new(request.challenge_id.unwrap_or_default())?;
    let status = state.registry().status(&token).await?;
    Ok(Json(StatusResponse {
        status: status.as_str(),
    }))
}

fn client_fingerprint(headers: &HeaderMap, peer: Option<&SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn render_interstitial(payload: &ChallengePayload) -> String {
    INTERSTITIAL_TEMPLATE
        .replace("{{ error_code }}", &payload.error_code.to_string())
        .replace("{{ error_reason }}", &escape_html(&payload.error_reason))
}

/// The reason string is caller-supplied; escape it before it lands in HTML.
fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        let peer: SocketAddr = "10.0.0.2:9999".parse().unwrap();

        assert_eq!(client_fingerprint(&headers, Some(&peer)), "203.0.113.7");
    }

    #[test]
    fn fingerprint_falls_back_to_peer_address() {
        let peer: SocketAddr = "10.0.0.2:9999".parse().unwrap();
        assert_eq!(client_fingerprint(&HeaderMap::new(), Some(&peer)), "10.0.0.2");
    }

    #[test]
    fn fingerprint_without_any_source_is_unknown() {
        assert_eq!(client_fingerprint(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn interstitial_substitutes_code_and_reason() {
        let payload = ChallengePayload {
            target_url: "https://example.com".to_string(),
            error_code: 429,
            error_reason: "rate limited".to_string(),
        };

        let html = render_interstitial(&payload);
        assert!(html.contains("429"));
        assert!(html.contains("rate limited"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn interstitial_escapes_markup_in_reason() {
        let payload = ChallengePayload {
            target_url: "https://example.com".to_string(),
            error_code: 429,
            error_reason: "<script>alert(1)</script>".to_string(),
        };

        let html = render_interstitial(&payload);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
