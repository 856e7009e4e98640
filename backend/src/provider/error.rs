//! Provider-specific error types
//!
//! Errors that can occur while talking to the remote model API.

use thiserror::Error;

/// Errors returned by a [`crate::provider::ModelProvider`]
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The HTTP request could not be sent or the body could not be read
    #[error("Failed to send HTTP request to Gemini API: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered 429
    #[error("Gemini API rate limit exceeded (HTTP 429): {0}")]
    RateLimited(String),

    /// The API answered with any other non-success status
    #[error("Gemini API returned error status {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The prompt or the response was blocked by the provider
    #[error("Gemini API blocked the prompt: {0}")]
    Blocked(String),

    /// A response frame could not be decoded
    #[error("Failed to parse Gemini API response: {0}")]
    Decode(String),
}
