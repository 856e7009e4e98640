//! Chat Proxy Backend
//!
//! An HTTP server that proxies chat histories to the Gemini API and streams
//! the reply back, with API-key rotation and a primary/fallback model retry.

use axum::{extract::Request, middleware::Next, response::Response};
use chat_proxy_backend::config::{load_dotenv, Config};
use chat_proxy_backend::credentials::{CredentialPool, KEY_LIST_VARS};
use chat_proxy_backend::provider::GeminiClient;
use chat_proxy_backend::proxy::ChatProxy;
use chat_proxy_backend::{api, state::AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment files first, so RUST_LOG from them is honored
    let loaded_env_files = load_dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    for path in &loaded_env_files {
        info!("Loaded environment from {}", path.display());
    }

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    let pool = CredentialPool::from_config(&config.provider);
    if pool.is_empty() {
        let defined: Vec<_> = KEY_LIST_VARS
            .iter()
            .filter(|var| std::env::var(var).is_ok())
            .collect();
        warn!(
            key_list_vars_defined = ?defined,
            "No API key configured; every chat request will fail until one is set"
        );
    } else {
        info!(keys = pool.len(), "Credential pool ready");
    }

    // Shared client for connection pooling
    let provider = GeminiClient::new(reqwest::Client::new(), config.provider.base_url.clone());
    let app_state = AppState::new(ChatProxy::new(pool, Arc::new(provider)));

    let app = api::router(app_state)
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()); // Allow CORS for development

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("🚀 Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
