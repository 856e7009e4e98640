//! Model provider module
//!
//! The [`ModelProvider`] trait is the seam between the chat proxy and the
//! remote generative API; [`gemini::GeminiClient`] is the production implementation.

pub mod error;
pub mod gemini;
pub mod gemini_types;

pub use error::ProviderError;
pub use gemini::GeminiClient;

use crate::chat::models::NormalizedMessage;
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Ordered stream of text deltas produced by one generation
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

/// Everything needed to run one generation, independent of model and key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// System instruction prepended to the conversation
    pub system_prompt: String,
    /// Normalized conversation history, oldest first
    pub messages: Vec<NormalizedMessage>,
}

/// A remote model that can stream a reply
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Open a streaming generation with the given key and model
    ///
    /// Returns once the upstream has accepted the request; the text itself
    /// arrives through the returned stream.
    async fn stream_generate(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<TextStream, ProviderError>;
}
