//! API module
//!
//! Contains HTTP request handlers and the router shared by the binary and tests

pub mod chat;
pub mod health;
pub mod streaming;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Build the application routes without transport middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::hello_world))
        .route("/api/health", get(health::health_check))
        .route("/api/chat", post(chat::chat))
        .with_state(state)
}
