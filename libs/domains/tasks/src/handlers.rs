use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{ErrorResponse, JsonBody, QueryParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::{TaskError, TaskResult};
use crate::models::{
    BulkDeleteResult, BulkUpdateResult, CreateTask, Task, TaskId, TaskPriority, TaskStatus,
    UpdateTask,
};
use crate::query::{
    DEFAULT_PAGE_SIZE, PageMeta, PageRequest, SortOrder, TaskFilter, TaskPage, TaskSort,
    TaskSortField,
};
use crate::repository::TaskRepository;
use crate::service::TaskService;

const TAG: &str = "tasks";

/// OpenAPI documentation for the Tasks API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_tasks,
        create_task,
        get_task,
        update_task,
        delete_task,
        list_by_status,
        list_by_priority,
        bulk_update,
        bulk_delete,
    ),
    components(schemas(
        Task,
        CreateTask,
        UpdateTask,
        TaskStatus,
        TaskPriority,
        TaskFilter,
        TaskSort,
        TaskSortField,
        SortOrder,
        PageMeta,
        TaskPage,
        BulkUpdateRequest,
        BulkDeleteRequest,
        BulkUpdateResponse,
        BulkDeleteResponse,
        ErrorResponse,
    )),
    tags(
        (name = TAG, description = "Task management endpoints")
    )
)]
pub struct TasksApiDoc;

/// Create the task router with all HTTP endpoints
pub fn router<R: TaskRepository + 'static>(service: TaskService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/status/{status}", get(list_by_status))
        .route("/priority/{priority}", get(list_by_priority))
        .route("/bulk/update", post(bulk_update))
        .route("/bulk/delete", post(bulk_delete))
        .with_state(shared_service)
}

fn parse_task_id(raw: &str) -> TaskResult<TaskId> {
    raw.parse()
        .map_err(|_| TaskError::Validation(format!("'{raw}' is not a valid task id")))
}

/// Query string of the list endpoint.
///
/// Page mode (`page`, `page_size`) is the default; offset mode is used as
/// soon as `skip` or `limit` is present.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Items per page, 0..=100 (default 10)
    pub page_size: Option<i64>,
    /// Rows to skip (offset mode)
    pub skip: Option<i64>,
    /// Maximum rows, 0..=100 (offset mode)
    pub limit: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring of the assignee
    pub assigned_to: Option<String>,
    /// Exclusive lower bound
    pub created_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub created_before: Option<DateTime<Utc>>,
    /// Exclusive lower bound
    pub due_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub due_before: Option<DateTime<Utc>>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub has_due_date: Option<bool>,
    pub is_overdue: Option<bool>,
    /// Sort column (default `created_at`)
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default `desc`)
    pub sort_order: Option<String>,
}

impl ListTasksQuery {
    pub fn into_parts(self) -> TaskResult<(TaskFilter, TaskSort, PageRequest)> {
        let sort = TaskSort::parse(self.sort_by.as_deref(), self.sort_order.as_deref())?;

        let page = if self.skip.is_some() || self.limit.is_some() {
            PageRequest::Offset {
                offset: self.skip.unwrap_or(0),
                limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            }
        } else {
            PageRequest::Page {
                page: self.page.unwrap_or(1),
                page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            }
        };

        let filter = TaskFilter {
            status: self.status,
            priority: self.priority,
            assigned_to: self.assigned_to,
            created_after: self.created_after,
            created_before: self.created_before,
            due_after: self.due_after,
            due_before: self.due_before,
            search: self.search,
            has_due_date: self.has_due_date,
            is_overdue: self.is_overdue,
        };

        Ok((filter, sort, page))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkUpdateRequest {
    pub task_ids: Vec<TaskId>,
    pub update_data: UpdateTask,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub task_ids: Vec<TaskId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkUpdateResponse {
    pub success: bool,
    pub message: String,
    pub affected_count: usize,
    #[serde(flatten)]
    pub result: BulkUpdateResult,
}

impl From<BulkUpdateResult> for BulkUpdateResponse {
    fn from(result: BulkUpdateResult) -> Self {
        Self {
            success: true,
            message: format!("Successfully updated {} tasks", result.updated.len()),
            affected_count: result.updated.len(),
            result,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub message: String,
    pub affected_count: usize,
    #[serde(flatten)]
    pub result: BulkDeleteResult,
}

impl From<BulkDeleteResult> for BulkDeleteResponse {
    fn from(result: BulkDeleteResult) -> Self {
        Self {
            success: true,
            message: format!("Successfully deleted {} tasks", result.deleted.len()),
            affected_count: result.deleted.len(),
            result,
        }
    }
}

/// List tasks with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ListTasksQuery),
    responses(
        (status = 200, description = "One page of tasks", body = TaskPage),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 422, description = "Invalid sort or pagination", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_tasks<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    QueryParams(query): QueryParams<ListTasksQuery>,
) -> TaskResult<Json<TaskPage>> {
    let (filter, sort, page) = query.into_parts()?;
    let page = service.list_tasks(filter, sort, page).await?;
    Ok(Json(page))
}

/// Create a new task
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 422, description = "Invalid task data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    JsonBody(input): JsonBody<CreateTask>,
) -> TaskResult<impl IntoResponse> {
    let task = service.create_task(input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Get a task by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Malformed task id", body = ErrorResponse)
    )
)]
async fn get_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    Path(id): Path<String>,
) -> TaskResult<Json<Task>> {
    let task = service.get_task(parse_task_id(&id)?).await?;
    Ok(Json(task))
}

/// Update a task; `null` clears description, due_date or assigned_to
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Invalid task data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn update_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<UpdateTask>,
) -> TaskResult<Json<Task>> {
    let task = service.update_task(parse_task_id(&id)?, patch).await?;
    Ok(Json(task))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 422, description = "Malformed task id", body = ErrorResponse)
    )
)]
async fn delete_task<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    Path(id): Path<String>,
) -> TaskResult<impl IntoResponse> {
    service.delete_task(parse_task_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All tasks with the given status, by ascending id
#[utoipa::path(
    get,
    path = "/status/{status}",
    tag = TAG,
    params(
        ("status" = TaskStatus, Path, description = "Task status")
    ),
    responses(
        (status = 200, description = "Tasks with the status", body = Vec<Task>),
        (status = 422, description = "Unknown status", body = ErrorResponse)
    )
)]
async fn list_by_status<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    Path(status): Path<String>,
) -> TaskResult<Json<Vec<Task>>> {
    let status: TaskStatus = status
        .parse()
        .map_err(|_| TaskError::Validation(format!("Unknown task status '{status}'")))?;
    let tasks = service.list_by_status(status).await?;
    Ok(Json(tasks))
}

/// All tasks with the given priority, by ascending id
#[utoipa::path(
    get,
    path = "/priority/{priority}",
    tag = TAG,
    params(
        ("priority" = TaskPriority, Path, description = "Task priority")
    ),
    responses(
        (status = 200, description = "Tasks with the priority", body = Vec<Task>),
        (status = 422, description = "Unknown priority", body = ErrorResponse)
    )
)]
async fn list_by_priority<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    Path(priority): Path<String>,
) -> TaskResult<Json<Vec<Task>>> {
    let priority: TaskPriority = priority
        .parse()
        .map_err(|_| TaskError::Validation(format!("Unknown task priority '{priority}'")))?;
    let tasks = service.list_by_priority(priority).await?;
    Ok(Json(tasks))
}

/// Apply one patch to many tasks
#[utoipa::path(
    post,
    path = "/bulk/update",
    tag = TAG,
    request_body = BulkUpdateRequest,
    responses(
        (status = 200, description = "Existing tasks updated, absent ids reported", body = BulkUpdateResponse),
        (status = 400, description = "No task ids given", body = ErrorResponse),
        (status = 422, description = "Invalid or empty patch", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn bulk_update<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    JsonBody(request): JsonBody<BulkUpdateRequest>,
) -> TaskResult<Json<BulkUpdateResponse>> {
    let result = service
        .bulk_update(request.task_ids, request.update_data)
        .await?;
    Ok(Json(result.into()))
}

/// Delete many tasks
#[utoipa::path(
    post,
    path = "/bulk/delete",
    tag = TAG,
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Existing tasks deleted, absent ids reported", body = BulkDeleteResponse),
        (status = 400, description = "No task ids given", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn bulk_delete<R: TaskRepository>(
    State(service): State<Arc<TaskService<R>>>,
    JsonBody(request): JsonBody<BulkDeleteRequest>,
) -> TaskResult<Json<BulkDeleteResponse>> {
    let result = service.bulk_delete(request.task_ids).await?;
    Ok(Json(result.into()))
}
