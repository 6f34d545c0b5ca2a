use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gatehouse_core::ChallengeError;
use serde_json::json;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Handler-level error, mapped onto the wire per the service's taxonomy.
///
/// Unknown and expired tokens answer with a neutral 404 so a prober cannot
/// tell whether a token ever existed. Store unavailability is a distinct
/// condition from an absent key and surfaces as 409.
#[derive(Debug)]
pub enum AppError {
    Challenge(ChallengeError),
    Pool(gatehouse_pool::Error),
}

impl From<ChallengeError> for AppError {
    fn from(e: ChallengeError) -> Self {
        AppError::Challenge(e)
    }
}

impl From<gatehouse_pool::Error> for AppError {
    fn from(e: gatehouse_pool::Error) -> Self {
        AppError::Pool(e)
    }
}

/// Short machine-readable JSON body used by every error response.
pub fn message_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Challenge(ChallengeError::Unacceptable(reason)) => {
                message_body(StatusCode::NOT_ACCEPTABLE, &reason)
            }
            AppError::Challenge(ChallengeError::NotFound) => {
                message_body(StatusCode::NOT_FOUND, "Not Found")
            }
            AppError::Challenge(ChallengeError::Unavailable(_)) => {
                message_body(StatusCode::CONFLICT, "Conflict")
            }
            AppError::Challenge(ChallengeError::InvalidData(reason)) => {
                error!(reason, "stored challenge data is invalid");
                message_body(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
            AppError::Pool(gatehouse_pool::Error::TooManyRequests) => {
                message_body(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests")
            }
            AppError::Pool(gatehouse_pool::Error::Exhausted(_)) => {
                message_body(StatusCode::SERVICE_UNAVAILABLE, "candidate pool exhausted")
            }
            AppError::Pool(gatehouse_pool::Error::Store(_)) => {
                message_body(StatusCode::CONFLICT, "Conflict")
            }
            AppError::Pool(e) => {
                error!(error = %e, "pool operation failed");
                message_body(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_neutral() {
        let response = AppError::Challenge(ChallengeError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unavailable_is_conflict_not_not_found() {
        let response =
            AppError::Challenge(ChallengeError::Unavailable("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn limiter_exhaustion_is_429() {
        let response = AppError::Pool(gatehouse_pool::Error::TooManyRequests).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn pool_exhaustion_is_503() {
        let response =
            AppError::Pool(gatehouse_pool::Error::Exhausted("all busy".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
