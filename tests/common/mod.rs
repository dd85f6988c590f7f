//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

use todo_plus::clock::ManualClock;
use todo_plus::config::WebConfig;
use todo_plus::identity::TrustingVerifier;
use todo_plus::test_utils::{manual_clock, test_pool};
use todo_plus::web::{create_app, state::AppState};

pub const NOW: &str = "2026-10-18 12:00:00";

/// Router over a fresh in-memory store, with the clock pinned to [`NOW`]
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(WebConfig::default()).await
    }

    pub async fn with_config(config: WebConfig) -> Self {
        let pool = test_pool().await;
        let clock = manual_clock(NOW);
        let state = AppState::new(
            pool.clone(),
            clock.clone(),
            Arc::new(TrustingVerifier),
            config,
        );
        Self {
            router: create_app(state),
            pool,
            clock,
        }
    }

    /// Send a request and decode the JSON response body (`Null` when empty).
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Create a task through the API and return its JSON.
    pub async fn create_task(&self, body: Value) -> Value {
        let (status, json) = self.post("/api/tasks", body).await;
        assert_eq!(status, StatusCode::OK, "create failed: {json}");
        json["task"].clone()
    }

    pub async fn list(&self, query: &str) -> Vec<Value> {
        let (status, json) = self.get(&format!("/api/tasks?{query}")).await;
        assert_eq!(status, StatusCode::OK, "list failed: {json}");
        json["tasks"].as_array().cloned().unwrap_or_default()
    }
}

pub fn titles(tasks: &[Value]) -> Vec<&str> {
    tasks.iter().filter_map(|t| t["title"].as_str()).collect()
}
