//! HTTP contract tests for the todos and search routes.
//!
//! The router runs in-process over the file-backed Data API, driven with
//! `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use atlas_service::router::router;
use atlas_service::{App, IdStrategy, TodoSettings};

use common::{FailingEmbedder, app, file_api, seed_places};

async fn send(app: &App, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(body) => Body::from(body.to_string()),
        None => Body::empty(),
    };
    let response = router(app.clone())
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// Validation and error contract
// ============================================================================

#[tokio::test]
async fn test_create_without_title_is_400() {
    let temp = TempDir::new().unwrap();
    let (status, body) = send(&app(&temp), "POST", "/todos", Some(json!({"description": "x"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "title is required"}));
}

#[tokio::test]
async fn test_update_with_empty_body_is_400() {
    let temp = TempDir::new().unwrap();
    let (status, body) = send(&app(&temp), "PUT", "/todos/123", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No fields to update"}));
}

#[tokio::test]
async fn test_get_missing_todo_is_404() {
    let temp = TempDir::new().unwrap();
    let (status, body) = send(&app(&temp), "GET", "/todos/doesnotexist", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Todo not found"}));
}

#[tokio::test]
async fn test_search_without_query_is_400() {
    let temp = TempDir::new().unwrap();
    let (status, body) = send(&app(&temp), "POST", "/search", Some(json!({"limit": 5}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "query parameter is required"}));
}

#[tokio::test]
async fn test_unsupported_methods_get_json_405() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    for (method, uri) in [("PATCH", "/todos/1"), ("HEAD", "/todos"), ("GET", "/search")] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        if method != "HEAD" {
            assert_eq!(body, json!({"error": "Method not allowed"}));
        }
    }
}

#[tokio::test]
async fn test_post_to_todo_item_is_405_and_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let (status, body) = send(&app, "POST", "/todos/123", Some(json!({"title": "t"}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "Method not allowed"}));

    let (status, body) = send(&app, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"todos": []}));
}

#[tokio::test]
async fn test_delete_without_id_is_400() {
    let temp = TempDir::new().unwrap();
    let (status, body) = send(&app(&temp), "DELETE", "/todos", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "todo id is required"}));
}

#[tokio::test]
async fn test_malformed_json_is_generic_500() {
    let temp = TempDir::new().unwrap();
    let response = router(app(&temp))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/todos")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_embedding_failure_is_generic_500() {
    let temp = TempDir::new().unwrap();
    let app = App::new(file_api(&temp), Arc::new(FailingEmbedder::new()));

    let (status, body) = send(&app, "POST", "/search", Some(json!({"query": "temples"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

// ============================================================================
// CRUD flow
// ============================================================================

#[tokio::test]
async fn test_todo_lifecycle() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);

    let (status, created) = send(
        &app,
        "POST",
        "/todos",
        Some(json!({"title": "Complete workshop", "description": "Learn about MongoDB Atlas"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["insertedId"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["todos"].as_array().unwrap().len(), 1);

    let (status, todo) = send(&app, "GET", &format!("/todos/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["title"], "Complete workshop");
    assert_eq!(todo["completed"], false);
    assert_eq!(todo["created_at"], todo["updated_at"]);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/todos/{}", id),
        Some(json!({"completed": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["modifiedCount"], 1);

    let (_, todo) = send(&app, "GET", &format!("/todos/{}", id), None).await;
    assert_eq!(todo["completed"], true);

    let (status, deleted) = send(&app, "DELETE", &format!("/todos/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"message": "Todo deleted successfully"}));

    let (status, _) = send(&app, "DELETE", &format!("/todos/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_of_missing_todo_is_404() {
    let temp = TempDir::new().unwrap();
    let (status, body) = send(
        &app(&temp),
        "PUT",
        "/todos/nothere",
        Some(json!({"title": "renamed"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Todo not found"}));
}

#[tokio::test]
async fn test_field_id_strategy_round_trip() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp).with_todos(TodoSettings {
        id_strategy: IdStrategy::field(),
        ..TodoSettings::default()
    });

    let (status, created) = send(&app, "POST", "/todos", Some(json!({"title": "uuid keyed"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let todo_id = created["todo_id"].as_str().unwrap().to_string();

    let (status, todo) = send(&app, "GET", &format!("/todos/{}", todo_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(todo["title"], "uuid keyed");
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_returns_ranked_projection() {
    let temp = TempDir::new().unwrap();
    let app = app(&temp);
    seed_places(app.data_api()).await;

    let (status, body) = send(
        &app,
        "POST",
        "/search",
        Some(json!({"query": "beach vacation", "limit": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["Place Name"], "Bali");
    assert_eq!(documents[0]["index"], 1);
    assert!(documents[0]["score"].is_number());
    assert!(documents[0].get("details_embedding").is_none());
}

#[tokio::test]
async fn test_search_rejects_bad_limit() {
    let temp = TempDir::new().unwrap();
    let (status, body) = send(
        &app(&temp),
        "POST",
        "/search",
        Some(json!({"query": "temples", "limit": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "limit must be a positive integer"}));
}
