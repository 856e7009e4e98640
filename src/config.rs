// Client configuration
// Loaded from environment variables with defaults

/// Backend address used when CHAT_BACKEND_URL is not set
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080";

/// Settings for the desktop client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the chat proxy backend, without trailing slash
    pub backend_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_backend_url(std::env::var("CHAT_BACKEND_URL").ok())
    }

    fn from_backend_url(value: Option<String>) -> Self {
        match value {
            Some(url) if !url.trim().is_empty() => Self {
                backend_url: url.trim().trim_end_matches('/').to_string(),
            },
            _ => Self::default(),
        }
    }

    /// Full URL of the chat endpoint
    pub fn chat_endpoint(&self) -> String {
        format!("{}/api/chat", self.backend_url)
    }
}
