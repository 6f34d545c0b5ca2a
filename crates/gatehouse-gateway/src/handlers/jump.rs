use crate::error::{message_body, Result};
use crate::model::{JumpRequest, JumpResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use gatehouse_core::ExpiringStore;
use tracing::{debug, warn};

/// Node names look like `node3`.
const NODE_PREFIX: &str = "node";

/// Cookie carrying the relayed session token.
const ACCESS_TOKEN_COOKIE: &str = "access-token";

/// Jumps the caller onto a secondary node: probes the node, claims a free
/// pooled credential (rate-limited), performs the login, and relays the
/// session cookie back.
pub async fn jump_handler<S: ExpiringStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<JumpRequest>,
) -> Result<Response> {
    let Some(server) = request.server.filter(|s| !s.is_empty()) else {
        return Ok(message_body(StatusCode::NOT_ACCEPTABLE, "server is required"));
    };
    let Some(node) = parse_node(&server) else {
        return Ok(message_body(
            StatusCode::NOT_ACCEPTABLE,
            "unrecognized server name",
        ));
    };
    if node == 1 {
        return Ok(message_body(
            StatusCode::NOT_FOUND,
            "primary node does not support passwordless login",
        ));
    }

    let node_url = state
        .jump()
        .node_url_template
        .replace("{n}", &(node - 1).to_string());

    // A live node fronts everything with the challenge gate, so the bare
    // probe answers 403. Anything else means the node is not serving.
    let probe = match state.http().get(&node_url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(node_url, error = %e, "node probe failed");
            return Ok(message_body(StatusCode::BAD_REQUEST, "node unreachable"));
        }
    };
    if probe.status().as_u16() != 403 {
        debug!(node_url, status = probe.status().as_u16(), "node probe did not hit the gate");
        return Ok(message_body(StatusCode::BAD_REQUEST, "node offline"));
    }

    state.limiter().allow()?;
    let credential = state.pool().select_free().await?;

    let login_url = format!("{node_url}/login");
    let form = [
        ("username", credential.username.as_str()),
        ("password", credential.password.as_str()),
    ];
    let login = match state
        .http()
        .post(&login_url)
        .header(header::ACCEPT.as_str(), "application/json")
        .form(&form)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(login_url, error = %e, "login request failed");
            return Ok(message_body(StatusCode::BAD_REQUEST, "node unreachable"));
        }
    };
    if login.status().as_u16() != 200 {
        debug!(login_url, status = login.status().as_u16(), "login rejected");
        return Ok(message_body(StatusCode::NOT_FOUND, "login rejected"));
    }

    let token = login
        .headers()
        .get(header::SET_COOKIE.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(extract_access_token);
    let Some(token) = token else {
        return Ok(message_body(
            StatusCode::NOT_FOUND,
            "cookie missing from login response",
        ));
    };

    let mut cookie = format!("{ACCESS_TOKEN_COOKIE}={token}; Path=/");
    if let Some(domain) = &state.jump().cookie_domain {
        cookie.push_str(&format!("; Domain={domain}"));
    }
    let Ok(cookie) = HeaderValue::from_str(&cookie) else {
        return Ok(message_body(
            StatusCode::NOT_FOUND,
            "cookie from login response is unusable",
        ));
    };

    let mut response = (
        StatusCode::CREATED,
        Json(JumpResponse {
            url: node_url,
            msg: "ok",
        }),
    )
        .into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

fn parse_node(server: &str) -> Option<u32> {
    server.strip_prefix(NODE_PREFIX)?.parse().ok()
}

/// Pulls the access-token value out of a `Set-Cookie` header.
fn extract_access_token(set_cookie: &str) -> Option<String> {
    let first = set_cookie.split(';').next()?;
    let value = first.trim().strip_prefix("access-token=")?;
    let value = value.trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_names() {
        assert_eq!(parse_node("node2"), Some(2));
        assert_eq!(parse_node("node10"), Some(10));
        assert_eq!(parse_node("node"), None);
        assert_eq!(parse_node("nodeX"), None);
        assert_eq!(parse_node("cluster2"), None);
    }

    #[test]
    fn extracts_access_token_from_cookie_header() {
        assert_eq!(
            extract_access_token("access-token=abc123; Path=/; HttpOnly"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_access_token("access-token=\"quoted\"; Path=/"),
            Some("quoted".to_string())
        );
    }

    #[test]
    fn missing_or_foreign_cookie_yields_none() {
        assert_eq!(extract_access_token("session=abc"), None);
        assert_eq!(extract_access_token("access-token=; Path=/"), None);
        assert_eq!(extract_access_token(""), None);
    }
}
