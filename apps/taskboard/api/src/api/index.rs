//! Root index listing the service's endpoints.

use axum::{Json, Router, extract::State, routing::get};
use core_config::AppInfo;
use serde::Serialize;
use std::collections::BTreeMap;

type Endpoints = BTreeMap<&'static str, &'static str>;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: IndexEndpoints,
}

#[derive(Debug, Serialize)]
pub struct IndexEndpoints {
    #[serde(flatten)]
    pub core: Endpoints,
    pub routers: BTreeMap<&'static str, Endpoints>,
}

fn core_endpoints() -> Endpoints {
    BTreeMap::from([
        ("GET /", "API information and available endpoints"),
        ("GET /swagger-ui", "Interactive API documentation"),
        ("GET /api-docs/openapi.json", "OpenAPI schema"),
        ("GET /health", "Liveness check"),
        ("GET /ready", "Readiness check against the task store"),
    ])
}

fn task_endpoints() -> Endpoints {
    BTreeMap::from([
        ("GET /api/tasks", "List tasks with filters, sorting and pagination"),
        ("POST /api/tasks", "Create a task"),
        ("GET /api/tasks/{id}", "Get a task by id"),
        ("PUT /api/tasks/{id}", "Update a task"),
        ("DELETE /api/tasks/{id}", "Delete a task"),
        ("GET /api/tasks/status/{status}", "List tasks with a status"),
        ("GET /api/tasks/priority/{priority}", "List tasks with a priority"),
        ("POST /api/tasks/bulk/update", "Apply one update to many tasks"),
        ("POST /api/tasks/bulk/delete", "Delete many tasks"),
    ])
}

pub async fn index_handler(State(app): State<AppInfo>) -> Json<IndexResponse> {
    Json(IndexResponse {
        name: app.name,
        version: app.version,
        endpoints: IndexEndpoints {
            core: core_endpoints(),
            routers: BTreeMap::from([("tasks", task_endpoints())]),
        },
    })
}

/// Router exposing `GET /`.
pub fn index_router(app_info: AppInfo) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .with_state(app_info)
}
