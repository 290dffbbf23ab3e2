#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use monoque::config::MonoqueConfig;
use monoque::db;
use monoque::llm::mock::ScriptedBackend;
use monoque::server::{build_router, AppState};
use rusqlite::Connection;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Router over an in-memory database and a scripted model.
pub fn test_app(backend: Arc<ScriptedBackend>) -> (Router, AppState) {
    test_app_with_config(backend, MonoqueConfig::default())
}

pub fn test_app_with_config(
    backend: Arc<ScriptedBackend>,
    config: MonoqueConfig,
) -> (Router, AppState) {
    let state = AppState::new(db::shared(test_db()), backend, config);
    (build_router(state.clone()), state)
}

/// Send a request and return the status plus the body as JSON
/// (non-JSON bodies come back as a JSON string).
pub async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, json)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    call(router, "GET", uri, None).await
}

pub async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(router, "POST", uri, Some(body)).await
}
