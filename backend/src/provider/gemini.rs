//! Gemini API client
//!
//! Direct HTTP client for the Gemini REST API. Generation uses
//! `streamGenerateContent?alt=sse` so text reaches the caller as it is produced.

use crate::provider::error::ProviderError;
use crate::provider::gemini_types::{GeminiApiRequest, GeminiApiResponse, ListModelsResponse};
use crate::provider::{GenerationRequest, ModelProvider, TextStream};
use async_trait::async_trait;
use futures_util::StreamExt;

/// Method name a model must support to be usable for chat
const GENERATE_CONTENT_METHOD: &str = "generateContent";

/// Finish reasons that end a candidate normally
const NORMAL_FINISH_REASONS: [&str; 2] = ["STOP", "MAX_TOKENS"];

/// Gemini REST client sharing one connection pool
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Create a client against the given API base URL
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// List the models that support `generateContent`, by resource name
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key)])
            .send()
            .await?;
        let response = check_status(response).await?;

        let body = response.text().await?;
        let parsed: ListModelsResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(parsed
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == GENERATE_CONTENT_METHOD)
            })
            .map(|m| m.name)
            .collect())
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn stream_generate(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<TextStream, ProviderError> {
        let url = format!("{}/models/{}:streamGenerateContent", self.base_url, model);
        let body = GeminiApiRequest::from(request);

        tracing::debug!(
            model = %model,
            message_count = request.messages.len(),
            "Calling Gemini streaming API"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("alt", "sse"), ("key", api_key)])
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let mut bytes = Box::pin(response.bytes_stream());
        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::default();
            'read: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ProviderError::Request(e));
                        break 'read;
                    }
                };
                for payload in decoder.push(&chunk) {
                    match decode_frame(&payload) {
                        Ok(texts) => {
                            for text in texts {
                                yield Ok(text);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            break 'read;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Turn a non-success response into the matching error
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status_code = status.as_u16();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());

    tracing::error!(
        status_code = status_code,
        error_body = %error_body,
        "Gemini API returned error status"
    );

    if status_code == 429 {
        return Err(ProviderError::RateLimited(error_body));
    }
    Err(ProviderError::Api {
        status: status_code,
        body: error_body,
    })
}

/// Decode one `data:` payload into the text deltas it carries
fn decode_frame(payload: &str) -> Result<Vec<String>, ProviderError> {
    let parsed: GeminiApiResponse = serde_json::from_str(payload)
        .map_err(|e| ProviderError::Decode(format!("{} - frame: {}", e, payload)))?;

    if let Some(reason) = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_ref())
    {
        return Err(ProviderError::Blocked(reason.clone()));
    }

    let mut texts = Vec::new();
    for candidate in parsed.candidates.into_iter().take(1) {
        match candidate.content {
            Some(content) => texts.extend(
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .filter(|text| !text.is_empty()),
            ),
            None => {
                if let Some(reason) = candidate.finish_reason {
                    if !NORMAL_FINISH_REASONS.contains(&reason.as_str()) {
                        return Err(ProviderError::Blocked(reason));
                    }
                }
            }
        }
    }
    Ok(texts)
}

/// Incremental server-sent-event reader
///
/// Buffers raw bytes so that lines (and UTF-8 sequences) split across network
/// chunks are reassembled before decoding.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed bytes, returning the `data:` payloads of every completed line
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim_start();
                if !data.is_empty() {
                    payloads.push(data.to_string());
                }
            }
        }
        payloads
    }
}
