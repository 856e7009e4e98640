//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::path::PathBuf;

/// Environment files consulted at startup, in priority order
pub const DOTENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Default Gemini REST API base URL
pub const DEFAULT_GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Model provider configuration
    pub provider: ProviderConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Model provider configuration
///
/// Raw credential sources are kept as read from the environment; parsing them
/// into a pool is the job of [`crate::credentials::CredentialPool`].
#[derive(Clone, Default)]
pub struct ProviderConfig {
    /// Comma-separated key list (`GOOGLE_GENERATIVE_AI_API_KEYS` or `GOOGLE_API_KEYS`)
    pub api_keys: Option<String>,
    /// Single-key fallback (`GOOGLE_GENERATIVE_AI_API_KEY`)
    pub api_key: Option<String>,
    /// Gemini API base URL
    pub base_url: String,
}

// Keys must never reach the log output.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_keys", &self.api_keys.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            provider: ProviderConfig {
                api_keys: env::var("GOOGLE_GENERATIVE_AI_API_KEYS")
                    .or_else(|_| env::var("GOOGLE_API_KEYS"))
                    .ok(),
                api_key: env::var("GOOGLE_GENERATIVE_AI_API_KEY").ok(),
                base_url: env::var("GEMINI_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE_URL.to_string()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Load `.env.local` and `.env` from the working directory, if present
///
/// Variables already set in the process environment win over file values.
/// Returns the paths that were actually loaded.
pub fn load_dotenv() -> Vec<PathBuf> {
    DOTENV_FILES
        .iter()
        .map(PathBuf::from)
        .filter(|path| path.exists())
        .filter(|path| dotenv::from_path(path).is_ok())
        .collect()
}
