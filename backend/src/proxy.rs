//! Chat proxy
//!
//! Runs the two-attempt generation protocol: the primary model first, then
//! exactly one fallback model if the primary attempt fails. Each attempt draws
//! its own key from the credential pool.

use crate::chat::models::NormalizedMessage;
use crate::credentials::{CredentialPool, KEY_LIST_VARS};
use crate::error::AppError;
use crate::provider::{GenerationRequest, ModelProvider, TextStream};
use std::sync::Arc;
use tracing::{error, info, warn};

/// First-choice model
pub const PRIMARY_MODEL: &str = "gemini-2.5-flash";

/// Model tried once when the primary attempt fails
pub const FALLBACK_MODEL: &str = "gemini-1.5-flash";

/// System instruction sent with every conversation
pub const SYSTEM_PROMPT: &str =
    "You are a helpful, expert AI assistant. Format answers with clear Markdown.";

/// Proxy from normalized chat histories to a streamed model reply
///
/// Immutable once built; shared across requests behind an `Arc`.
pub struct ChatProxy {
    pool: CredentialPool,
    provider: Arc<dyn ModelProvider>,
    primary_model: String,
    fallback_model: String,
}

impl std::fmt::Debug for ChatProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatProxy")
            .field("pool", &self.pool)
            .field("primary_model", &self.primary_model)
            .field("fallback_model", &self.fallback_model)
            .finish()
    }
}

/// Which of the two attempts is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Primary,
    Fallback,
}

impl ChatProxy {
    /// Create a proxy using the default primary and fallback models
    pub fn new(pool: CredentialPool, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            pool,
            provider,
            primary_model: PRIMARY_MODEL.to_string(),
            fallback_model: FALLBACK_MODEL.to_string(),
        }
    }

    /// The credential pool this proxy draws from
    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    /// Stream a reply for the given history
    ///
    /// Tries the primary model, then the fallback model once. The fallback
    /// starts only after the primary failure has been observed.
    pub async fn stream_reply(
        &self,
        messages: Vec<NormalizedMessage>,
    ) -> Result<TextStream, AppError> {
        let request = GenerationRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages,
        };

        match self.attempt(Attempt::Primary, &request).await {
            Ok(stream) => Ok(stream),
            Err(primary_error) => {
                warn!(
                    primary_model = %self.primary_model,
                    fallback_model = %self.fallback_model,
                    error = %primary_error,
                    "Primary model failed, attempting fallback"
                );
                self.attempt(Attempt::Fallback, &request).await
            }
        }
    }

    async fn attempt(
        &self,
        attempt: Attempt,
        request: &GenerationRequest,
    ) -> Result<TextStream, AppError> {
        let model = match attempt {
            Attempt::Primary => &self.primary_model,
            Attempt::Fallback => &self.fallback_model,
        };

        let Some(api_key) = self.draw_key() else {
            return Err(match attempt {
                Attempt::Primary => {
                    let key_list_defined = KEY_LIST_VARS
                        .iter()
                        .any(|var| std::env::var(var).is_ok());
                    error!(
                        model = %model,
                        key_list_defined,
                        "No API key found (environment variable missing or empty)"
                    );
                    AppError::MissingApiKey(
                        "No API key found (environment variable missing or empty)".to_string(),
                    )
                }
                Attempt::Fallback => {
                    error!(model = %model, "No API key found for fallback");
                    AppError::MissingApiKey("No API key found for fallback".to_string())
                }
            });
        };

        info!(model = %model, attempt = ?attempt, "Opening model stream");
        let stream = self
            .provider
            .stream_generate(&api_key, model, request)
            .await?;
        Ok(stream)
    }

    /// Draw a fresh key; the thread-local RNG never lives across an await
    fn draw_key(&self) -> Option<String> {
        self.pool.select_key(&mut rand::rng()).map(str::to_owned)
    }
}
