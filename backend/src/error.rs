//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! Every failure of the chat endpoint surfaces as the same JSON shape:
//! `{"error": "Internal Server Error", "details": "<message>"}` with status 500.

use crate::provider::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Summary placed in the `error` field of every failure body
pub const ERROR_SUMMARY: &str = "Internal Server Error";

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// No credential could be drawn from the pool
    #[error("{0}")]
    MissingApiKey(String),

    /// The remote model call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The request body could not be read as a chat request
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON body returned for every error
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Short summary
    pub error: String,
    /// Diagnostic message
    pub details: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Error in chat API");

        let body = Json(ErrorBody {
            error: ERROR_SUMMARY.to_string(),
            details: self.to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_response_shape() {
        let response =
            AppError::MissingApiKey("No API key found for fallback".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], ERROR_SUMMARY);
        assert_eq!(body["details"], "No API key found for fallback");
    }

    #[test]
    fn test_provider_error_message_is_passed_through() {
        let err = AppError::from(ProviderError::RateLimited("quota".to_string()));
        assert_eq!(
            err.to_string(),
            "Gemini API rate limit exceeded (HTTP 429): quota"
        );
    }
}
