//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.
//!
//! The pipeline's failure taxonomy lives here: planning and synthesis failures
//! are fatal, a notification failure is fatal only under the `Surface` policy,
//! and individual search failures never become an `AppError` at all (they are
//! folded into `SearchOutcome::Failure` and dropped by the aggregator).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// The planning call failed or returned an unusable response
    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    /// The planner returned JSON that does not describe a usable search plan
    #[error("Invalid search plan: {0}")]
    InvalidPlan(String),

    /// The synthesis call failed or returned an unusable report
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Report delivery failed (fatal only under the `Surface` policy)
    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    /// Required credentials are missing from the environment
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Request validation failed (e.g., query too long)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration update validation failed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::PlanningFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::InvalidPlan(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::SynthesisFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::NotificationFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::MissingCredentials(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidConfig(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let response = AppError::InvalidRequest("query too long".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_maps_to_request_timeout() {
        let response = AppError::Timeout("pipeline deadline exceeded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_error_messages_include_reason() {
        let err = AppError::PlanningFailed("no candidates".to_string());
        assert!(err.to_string().contains("no candidates"));

        let err = AppError::SynthesisFailed("malformed JSON".to_string());
        assert!(err.to_string().contains("malformed JSON"));
    }
}
