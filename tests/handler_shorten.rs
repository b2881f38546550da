mod common;

use axum::{Router, routing::post};
use axum_test::TestServer;
use serde_json::json;
use shortlink::api::handlers::shorten_handler;
use shortlink::domain::repositories::LinkRepository;
use std::collections::HashSet;
use std::sync::Arc;

fn shorten_app(state: shortlink::AppState) -> TestServer {
    let app = Router::new()
        .route("/api/shorten", post(shorten_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_shorten_success() {
    let (state, _rx, repository) = common::create_test_state();
    let server = shorten_app(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "target_url": "https://example.com/a/very/long/path" }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["target_url"], "https://example.com/a/very/long/path");
    assert_eq!(json["clicks"], 0);
    assert!(json["id"].is_i64());
    let code = json["short_code"].as_str().unwrap();
    assert_eq!(code.len(), 7);
    assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));

    // Exactly the public fields.
    assert_eq!(json.as_object().unwrap().len(), 4);

    let stored = repository.lookup(code).await.unwrap().unwrap();
    assert_eq!(stored.target_url, "https://example.com/a/very/long/path");
}

#[tokio::test]
async fn test_shorten_returns_unique_codes() {
    let (state, _rx, repository) = common::create_test_state();
    let server = shorten_app(state);

    let mut codes = HashSet::new();
    for i in 0..50 {
        let response = server
            .post("/api/shorten")
            .json(&json!({ "target_url": format!("https://example.com/{i}") }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let json = response.json::<serde_json::Value>();
        codes.insert(json["short_code"].as_str().unwrap().to_string());
    }

    assert_eq!(codes.len(), 50);
    assert_eq!(repository.count().await.unwrap(), 50);
}

#[tokio::test]
async fn test_shorten_same_target_twice_creates_two_links() {
    let (state, _rx, _repository) = common::create_test_state();
    let server = shorten_app(state);

    let body = json!({ "target_url": "https://example.com/" });
    let first = server.post("/api/shorten").json(&body).await;
    let second = server.post("/api/shorten").json(&body).await;

    let first = first.json::<serde_json::Value>();
    let second = second.json::<serde_json::Value>();
    assert_ne!(first["short_code"], second["short_code"]);
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let (state, _rx, repository) = common::create_test_state();
    let server = shorten_app(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "target_url": "not-a-url" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "invalid_url");
    assert_eq!(repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_shorten_rejects_non_http_scheme() {
    let (state, _rx, repository) = common::create_test_state();
    let server = shorten_app(state);

    for target in ["ftp://example.com/file.txt", "javascript:alert(1)"] {
        let response = server
            .post("/api/shorten")
            .json(&json!({ "target_url": target }))
            .await;

        response.assert_status_bad_request();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["error"]["code"], "invalid_url", "{target}");
    }

    assert_eq!(repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_shorten_missing_field() {
    let (state, _rx, _repository) = common::create_test_state();
    let server = shorten_app(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shorten_code_space_exhausted() {
    let (state, _rx, repository) = common::create_test_state_with_generator(
        Arc::new(common::ConstantCodeGenerator("taken77")),
        3,
    );
    common::create_test_link(&repository, "taken77", "https://first.example.com/").await;
    let server = shorten_app(state);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "target_url": "https://second.example.com/" }))
        .await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "code_space_exhausted");
    assert_eq!(json["error"]["details"]["attempts"], 3);

    // The existing mapping is untouched.
    let existing = repository.lookup("taken77").await.unwrap().unwrap();
    assert_eq!(existing.target_url, "https://first.example.com/");
    assert_eq!(repository.count().await.unwrap(), 1);
}
