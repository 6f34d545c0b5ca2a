use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateChallengeRequest {
    pub redirect_url: Option<String>,
    /// A caller that already holds a token is sent to the process page.
    pub challenge_id: Option<String>,
    pub code: Option<u16>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateChallengeResponse {
    pub challenge_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub challenge_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub challenge_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub server: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JumpResponse {
    pub url: String,
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
