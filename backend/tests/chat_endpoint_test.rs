//! Integration tests for the chat endpoint
//!
//! These tests drive the full router against a mocked Gemini API:
//! 1. Primary model success streams the reply
//! 2. Primary failure falls back to the second model
//! 3. Total failure and missing keys surface as the JSON error body

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chat_proxy_backend::api::router;
use chat_proxy_backend::credentials::CredentialPool;
use chat_proxy_backend::provider::GeminiClient;
use chat_proxy_backend::proxy::{ChatProxy, FALLBACK_MODEL, PRIMARY_MODEL};
use chat_proxy_backend::state::AppState;
use mockito::{Matcher, Server, ServerGuard};
use serial_test::serial;
use std::sync::Arc;
use tower::ServiceExt;

const HI_REQUEST: &str = r#"{"messages":[{"role":"user","parts":[{"type":"text","text":"Hi"}]}]}"#;

fn gemini_frame(text: &str) -> String {
    format!(
        "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{}\"}}],\"role\":\"model\"}}}}]}}\r\n\r\n",
        text
    )
}

fn stream_path(model: &str) -> String {
    format!("/models/{}:streamGenerateContent", model)
}

fn app(server: &ServerGuard, keys: Option<&str>) -> Router {
    let provider = GeminiClient::new(reqwest::Client::new(), server.url());
    let pool = CredentialPool::from_sources(keys, None);
    router(AppState::new(ChatProxy::new(pool, Arc::new(provider))))
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
#[serial]
async fn test_primary_model_streams_reply() {
    let mut server = Server::new_async().await;
    let primary = server
        .mock("POST", stream_path(PRIMARY_MODEL).as_str())
        .match_query(Matcher::UrlEncoded("key".into(), "only-key".into()))
        .match_body(Matcher::PartialJsonString(
            r#"{"contents":[{"role":"user","parts":[{"text":"Hi"}]}]}"#.to_string(),
        ))
        .with_status(200)
        .with_body(format!("{}{}", gemini_frame("Hello"), gemini_frame(" there")))
        .create_async()
        .await;
    let fallback = server
        .mock("POST", stream_path(FALLBACK_MODEL).as_str())
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let response = app(&server, Some("only-key"))
        .oneshot(chat_request(HI_REQUEST))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    let body = read_body(response).await;
    let hello = body.find("\"delta\":\"Hello\"").unwrap();
    let there = body.find("\"delta\":\" there\"").unwrap();
    assert!(hello < there);
    assert!(body.ends_with("data: [DONE]\n\n"));

    primary.assert_async().await;
    fallback.assert_async().await;
}

#[tokio::test]
#[serial]
async fn test_primary_failure_uses_fallback_model() {
    let mut server = Server::new_async().await;
    let primary = server
        .mock("POST", stream_path(PRIMARY_MODEL).as_str())
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal")
        .expect(1)
        .create_async()
        .await;
    let fallback = server
        .mock("POST", stream_path(FALLBACK_MODEL).as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(gemini_frame("from fallback"))
        .expect(1)
        .create_async()
        .await;

    let response = app(&server, Some("a, b ,"))
        .oneshot(chat_request(HI_REQUEST))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_body(response).await.contains("from fallback"));
    primary.assert_async().await;
    fallback.assert_async().await;
}

#[tokio::test]
#[serial]
async fn test_both_models_failing_returns_json_error() {
    let mut server = Server::new_async().await;
    let _primary = server
        .mock("POST", stream_path(PRIMARY_MODEL).as_str())
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;
    let _fallback = server
        .mock("POST", stream_path(FALLBACK_MODEL).as_str())
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body("quota")
        .create_async()
        .await;

    let response = app(&server, Some("k"))
        .oneshot(chat_request(HI_REQUEST))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert!(body["details"].as_str().unwrap().contains("429"));
}

#[tokio::test]
#[serial]
async fn test_missing_keys_returns_json_error() {
    let server = Server::new_async().await;

    let response = app(&server, None)
        .oneshot(chat_request(HI_REQUEST))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert_eq!(body["details"], "No API key found for fallback");
}

#[tokio::test]
#[serial]
async fn test_unreadable_body_returns_json_error() {
    let server = Server::new_async().await;

    let response = app(&server, Some("k"))
        .oneshot(chat_request("not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
#[serial]
async fn test_malformed_entries_do_not_fail_the_batch() {
    let mut server = Server::new_async().await;
    let primary = server
        .mock("POST", stream_path(PRIMARY_MODEL).as_str())
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJsonString(
            r#"{"contents":[{"role":"user","parts":[{"text":"ok"}]},{"role":"user","parts":[{"text":""}]},{"role":"user","parts":[{"text":""}]}]}"#
                .to_string(),
        ))
        .with_status(200)
        .with_body(gemini_frame("fine"))
        .expect(1)
        .create_async()
        .await;

    let response = app(&server, Some("k"))
        .oneshot(chat_request(
            r#"{"messages":[{"role":"user","content":"ok"},"hi",7]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_body(response).await.contains("\"delta\":\"fine\""));
    primary.assert_async().await;
}

#[tokio::test]
async fn test_health_reports_key_count() {
    let server = Server::new_async().await;

    let response = app(&server, Some("a,b,c"))
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["configured_keys"], 3);
}
