//! # REST API Integration Tests
//!
//! Drives the full router (middleware included) with `tower::ServiceExt::oneshot`
//! against an in-memory store and a pinned clock.

mod common;

use axum::http::StatusCode;
use common::{titles, TestApp};
use serde_json::json;
use todo_plus::config::WebConfig;

#[tokio::test]
async fn test_auth_registers_once_and_keeps_first_names() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/auth",
            json!({ "tg_id": 12345, "first_name": "Ann", "username": "ann_k" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["externalId"], "12345");
    assert_eq!(body["user"]["firstName"], "Ann");
    assert_eq!(body["user"]["lastName"], "");
    assert_eq!(body["user"]["handle"], "ann_k");
    assert_eq!(body["user"]["createdAt"], common::NOW);

    let (status, again) = app
        .post("/api/auth", json!({ "externalId": "12345", "firstName": "Anna" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["user"]["id"], body["user"]["id"]);
    assert_eq!(again["user"]["firstName"], "Ann");
}

#[tokio::test]
async fn test_missing_identity_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/api/auth", json!({ "firstName": "Ann" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "externalId required");

    let (status, _) = app.post("/api/tasks", json!({ "title": "orphan" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/tasks").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_requires_title_and_applies_defaults() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/tasks", json!({ "externalId": "1", "title": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title required");

    let task = app
        .create_task(json!({ "externalId": 1, "title": "Buy milk" }))
        .await;
    assert_eq!(task["ownerExternalId"], "1");
    assert_eq!(task["description"], "");
    assert_eq!(task["tags"], json!([]));
    assert_eq!(task["priority"], 0);
    assert_eq!(task["dueAt"], json!(null));
    assert_eq!(task["reminderAt"], json!(null));
    assert_eq!(task["completed"], false);
    assert_eq!(task["reminderSent"], false);
    assert_eq!(task["createdAt"], common::NOW);
}

#[tokio::test]
async fn test_today_filter_round_trips_tags() {
    let app = TestApp::new().await;
    app.create_task(json!({
        "externalId": "7",
        "title": "Standup",
        "tags": ["work", "urgent"],
        "dueAt": "2026-10-18 18:00:00"
    }))
    .await;
    app.create_task(json!({ "externalId": "7", "title": "Tomorrow", "dueAt": "2026-10-19 09:00:00" }))
        .await;
    app.create_task(json!({ "externalId": "7", "title": "Someday" })).await;

    let today = app.list("externalId=7&filter=today").await;
    assert_eq!(titles(&today), vec!["Standup"]);
    assert_eq!(today[0]["tags"], json!(["work", "urgent"]));
    assert_eq!(today[0]["dueAt"], "2026-10-18 18:00:00");

    app.clock.advance(chrono::Duration::days(1));
    let tomorrow = app.list("externalId=7&filter=today").await;
    assert_eq!(titles(&tomorrow), vec!["Tomorrow"]);
}

#[tokio::test]
async fn test_active_and_completed_filters_and_falsy_update() {
    let app = TestApp::new().await;
    let done = app.create_task(json!({ "externalId": "7", "title": "Done" })).await;
    app.create_task(json!({ "externalId": "7", "title": "Open" })).await;

    let id = done["id"].as_i64().unwrap();
    let (status, body) = app
        .put(&format!("/api/tasks/{id}"), json!({ "completed": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["completed"], true);

    assert_eq!(titles(&app.list("externalId=7&filter=active").await), vec!["Open"]);
    assert_eq!(titles(&app.list("externalId=7&filter=completed").await), vec!["Done"]);
    assert_eq!(app.list("externalId=7&filter=all").await.len(), 2);
    assert_eq!(app.list("externalId=7").await.len(), 2);

    let (status, body) = app
        .put(&format!("/api/tasks/{id}"), json!({ "completed": 0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["completed"], false);
    assert!(app.list("externalId=7&filter=completed").await.is_empty());
}

#[tokio::test]
async fn test_unknown_filter_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/tasks?externalId=7&filter=overdue").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("overdue"));
}

#[tokio::test]
async fn test_search_matches_title_description_and_tags() {
    let app = TestApp::new().await;
    app.create_task(json!({ "externalId": "7", "title": "Buy MILK" })).await;
    app.create_task(json!({ "externalId": "7", "title": "Call mom", "description": "about milk" }))
        .await;
    app.create_task(json!({ "externalId": "7", "title": "Groceries", "tags": "shop,milk" }))
        .await;
    app.create_task(json!({ "externalId": "7", "title": "Unrelated" })).await;
    app.create_task(json!({ "externalId": "8", "title": "Other milk" })).await;

    let found = app.list("tg_id=7&q=milk").await;
    assert_eq!(found.len(), 3);
    assert!(!titles(&found).contains(&"Unrelated"));
    assert!(!titles(&found).contains(&"Other milk"));

    assert_eq!(app.list("externalId=7&q=%20%20").await.len(), 4);
}

#[tokio::test]
async fn test_search_passes_like_wildcards_through() {
    let app = TestApp::new().await;
    for title in ["abc", "a-c", "xyz"] {
        app.create_task(json!({ "externalId": "7", "title": title })).await;
    }
    app.create_task(json!({ "externalId": "8", "title": "abc elsewhere" })).await;

    assert_eq!(app.list("externalId=7&q=%25").await.len(), 3);

    let mut matched = titles(&app.list("externalId=7&q=a_c").await)
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    matched.sort();
    assert_eq!(matched, vec!["a-c", "abc"]);
}

#[tokio::test]
async fn test_list_sort_order() {
    let app = TestApp::new().await;
    app.create_task(json!({ "externalId": "7", "title": "undated", "priority": 9 }))
        .await;
    app.create_task(json!({ "externalId": "7", "title": "later", "dueAt": "2026-10-20 10:00:00" }))
        .await;
    app.create_task(json!({
        "externalId": "7", "title": "soon-low", "priority": 1, "dueAt": "2026-10-19 10:00:00"
    }))
    .await;
    app.create_task(json!({
        "externalId": "7", "title": "soon-high", "priority": 3, "dueAt": "2026-10-19 10:00:00"
    }))
    .await;

    let tasks = app.list("externalId=7").await;
    assert_eq!(
        titles(&tasks),
        vec!["soon-high", "soon-low", "later", "undated"]
    );
}

#[tokio::test]
async fn test_update_unknown_task_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.put("/api/tasks/999", json!({ "title": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_update_input_errors() {
    let app = TestApp::new().await;
    let task = app.create_task(json!({ "externalId": "7", "title": "t" })).await;
    let uri = format!("/api/tasks/{}", task["id"]);

    let (status, body) = app.put(&uri, json!({ "owner": "someone-else" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no fields to update");

    let (status, _) = app.put("/api/tasks/abc", json!({ "title": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put(&uri, json!({ "title": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put(&uri, json!({ "dueAt": "next week" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_accepts_legacy_names_and_clears_with_null() {
    let app = TestApp::new().await;
    let task = app
        .create_task(json!({
            "externalId": "7",
            "title": "t",
            "dueAt": "2026-10-20 10:00:00",
            "reminderAt": "2026-10-20 09:00:00"
        }))
        .await;
    let uri = format!("/api/tasks/{}", task["id"]);

    let (status, body) = app
        .put(&uri, json!({ "due_at": null, "reminder_sent": 1, "priority": 0, "tags": ["a", "b"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["dueAt"], json!(null));
    assert_eq!(body["task"]["reminderAt"], "2026-10-20 09:00:00");
    assert_eq!(body["task"]["reminderSent"], true);
    assert_eq!(body["task"]["tags"], json!(["a", "b"]));
}

#[tokio::test]
async fn test_delete_then_list() {
    let app = TestApp::new().await;
    let gone = app.create_task(json!({ "externalId": "7", "title": "gone" })).await;
    app.create_task(json!({ "externalId": "7", "title": "kept" })).await;

    let (status, body) = app.delete(&format!("/api/tasks/{}", gone["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "deleted": true }));

    let remaining = app.list("externalId=7").await;
    assert_eq!(titles(&remaining), vec!["kept"]);
    assert!(remaining.iter().all(|t| t["id"] != gone["id"]));

    let (status, _) = app.delete(&format!("/api/tasks/{}", gone["id"])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_a_client_error() {
    let app = TestApp::new().await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_failure_is_internal_and_can_be_redacted() {
    let app = TestApp::new().await;
    sqlx::query("DROP TABLE tasks").execute(&app.pool).await.unwrap();
    let (status, body) = app.get("/api/tasks?externalId=7").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("tasks"));

    let redacted = TestApp::with_config(WebConfig {
        redact_internal_errors: true,
        ..WebConfig::default()
    })
    .await;
    sqlx::query("DROP TABLE tasks")
        .execute(&redacted.pool)
        .await
        .unwrap();
    let (status, body) = redacted.get("/api/tasks?externalId=7").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");

    let (status, _) = redacted.get("/api/tasks").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timestamp"], common::NOW);

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    app.pool.close().await;
    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = TestApp::new().await;

    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert!(!response.headers()["x-request-id"].is_empty());
}
