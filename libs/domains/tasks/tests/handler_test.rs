//! Handler tests for Tasks domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Request deserialization (JSON / query string → Rust structs)
//! - Response serialization (Rust structs → JSON)
//! - HTTP status codes
//! - Error responses
//!
//! Unlike E2E tests, these test ONLY the tasks domain handlers,
//! not the full application with docs, health checks and middleware.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use domain_tasks::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::{TestDataBuilder, TestDatabase};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn app(db: &TestDatabase) -> Router {
    let service = TaskService::new(SqlTaskRepository::new(db.connection()));
    handlers::router(service)
}

async fn create(app: &Router, body: Value) -> Task {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_task_handler_returns_201() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    let builder = TestDataBuilder::from_test_name("handler_create_201");

    let task = create(
        &app,
        json!({
            "title": builder.title("main"),
            "description": "Handler test",
            "priority": "high",
            "assigned_to": builder.assignee("owner"),
        }),
    )
    .await;

    assert_eq!(task.title, builder.title("main"));
    assert_eq!(task.priority, TaskPriority::High);
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.updated_at.is_none());
}

#[tokio::test]
async fn test_create_task_handler_validates_title() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);

    let response = app
        .oneshot(json_request("POST", "/", json!({ "title": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_task_handler_rejects_unknown_status() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);

    let response = app
        .oneshot(json_request("POST", "/", json!({ "title": "x", "status": "done" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_task_handler_rejects_past_due_date() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    let yesterday = Utc::now() - Duration::days(1);

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "title": "late", "due_date": yesterday }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_task_handler() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    let created = create(&app, json!({ "title": "fetch me" })).await;

    let response = app
        .clone()
        .oneshot(get(&format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task: Task = json_body(response.into_body()).await;
    assert_eq!(task, created);

    let response = app.clone().oneshot(get("/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Task 999 not found");

    let response = app.oneshot(get("/not-a-number")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_task_handler_clears_with_null() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    let created = create(
        &app,
        json!({ "title": "patch me", "description": "old", "assigned_to": "ana" }),
    )
    .await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", created.id),
            json!({ "description": null, "status": "in_progress" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let task: Task = json_body(response.into_body()).await;
    assert_eq!(task.description, None);
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.assigned_to.as_deref(), Some("ana"));
    assert!(task.updated_at.is_some());
}

#[tokio::test]
async fn test_update_missing_task_returns_404() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);

    let response = app
        .oneshot(json_request("PUT", "/41", json!({ "priority": "low" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_task_handler() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    let created = create(&app, json!({ "title": "delete me" })).await;

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/{}", created.id))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_tasks_handler_returns_page_metadata() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    for i in 0..5 {
        create(&app, json!({ "title": format!("task {i}") })).await;
    }
    create(&app, json!({ "title": "started", "status": "in_progress" })).await;

    let response = app
        .oneshot(get("/?status=pending&sort_by=id&sort_order=ASC&page=2&page_size=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["has_previous"], true);
    assert_eq!(body["filters_applied"], json!({ "status": "pending" }));
    assert_eq!(body["sort"], json!({ "field": "id", "order": "asc" }));

    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["task 2", "task 3"]);
}

#[tokio::test]
async fn test_list_tasks_handler_offset_mode_with_zero_limit() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    create(&app, json!({ "title": "only" })).await;

    let response = app.oneshot(get("/?skip=0&limit=0")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page: TaskPage = json_body(response.into_body()).await;
    assert!(page.items.is_empty());
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.meta.total_pages, 0);
}

#[tokio::test]
async fn test_list_tasks_handler_search() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    create(&app, json!({ "title": "weekly sync", "description": "Prepare AGENDA" })).await;
    create(&app, json!({ "title": "lunch" })).await;

    let response = app.oneshot(get("/?search=agenda")).await.unwrap();

    let page: TaskPage = json_body(response.into_body()).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "weekly sync");
    assert_eq!(page.filters_applied.search.as_deref(), Some("agenda"));
}

#[tokio::test]
async fn test_list_tasks_handler_rejects_bad_parameters() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);

    for uri in [
        "/?sort_by=colour",
        "/?sort_order=sideways",
        "/?limit=101",
        "/?skip=-1",
        "/?page=0",
        "/?page_size=-3",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "{uri} should be rejected"
        );
    }

    // Not a status literal: rejected while parsing the query string
    let response = app.oneshot(get("/?status=done")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_by_status_and_priority_handlers() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    let a = create(&app, json!({ "title": "a", "status": "in_progress", "priority": "urgent" })).await;
    create(&app, json!({ "title": "b" })).await;
    let c = create(&app, json!({ "title": "c", "status": "in_progress" })).await;

    let response = app.clone().oneshot(get("/status/in_progress")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tasks: Vec<Task> = json_body(response.into_body()).await;
    assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id, c.id]);

    let response = app.clone().oneshot(get("/priority/urgent")).await.unwrap();
    let tasks: Vec<Task> = json_body(response.into_body()).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, a.id);

    let response = app.oneshot(get("/status/done")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_bulk_update_handler_reports_missing() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    let first = create(&app, json!({ "title": "first" })).await;
    let second = create(&app, json!({ "title": "second" })).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/bulk/update",
            json!({
                "task_ids": [second.id, 99, first.id],
                "update_data": { "status": "completed" }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["affected_count"], 2);
    assert_eq!(body["updated"], json!([first.id, second.id]));
    assert_eq!(body["missing"], json!([99]));
    assert_eq!(body["tasks"][0]["status"], "completed");
}

#[tokio::test]
async fn test_bulk_update_handler_rejects_empty_input() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/bulk/update",
            json!({ "task_ids": [], "update_data": { "status": "completed" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "POST",
            "/bulk/update",
            json!({ "task_ids": [1], "update_data": {} }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_bulk_delete_handler() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);
    let doomed = create(&app, json!({ "title": "doomed" })).await;
    let kept = create(&app, json!({ "title": "kept" })).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/bulk/delete",
            json!({ "task_ids": [doomed.id, 1234] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["affected_count"], 1);
    assert_eq!(body["deleted"], json!([doomed.id]));
    assert_eq!(body["missing"], json!([1234]));

    let response = app.clone().oneshot(get(&format!("/{}", kept.id))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request("POST", "/bulk/delete", json!({ "task_ids": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let db = TestDatabase::sqlite().await;
    let app = app(&db);

    let creates = (0..8).map(|i| create(&app, json!({ "title": format!("parallel {i}") })));
    let tasks = futures::future::join_all(creates).await;

    let mut ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}
