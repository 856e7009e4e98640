//! Health check and hello world handlers

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[allow(missing_docs)]
#[derive(Serialize)]
pub struct HelloResponse {
    pub message: String,
    pub status: String,
}

#[allow(missing_docs)]
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub message: String,
    /// Number of API keys in the credential pool
    pub configured_keys: usize,
}

/// GET / - Hello world
pub async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from Chat Proxy Backend!".to_string(),
        status: "ok".to_string(),
    })
}

/// GET /api/health - Liveness plus a credential summary
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let configured_keys = state.proxy.pool().len();
    let message = if configured_keys == 0 {
        "Backend is running but no API key is configured"
    } else {
        "Backend is healthy"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: message.to_string(),
        configured_keys,
    })
}
