use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::TaskId;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Empty request: {0}")]
    EmptyRequest(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

/// Convert TaskError to AppError for standardized error responses
impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => AppError::NotFound(format!("Task {id} not found")),
            TaskError::Validation(msg) => AppError::UnprocessableEntity(msg),
            TaskError::EmptyRequest(msg) => AppError::BadRequest(msg),
            TaskError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for TaskError {
    fn from(err: sea_orm::DbErr) -> Self {
        tracing::error!(error = %err, "Task store operation failed");
        TaskError::Database(err.to_string())
    }
}

impl From<ValidationErrors> for TaskError {
    fn from(errors: ValidationErrors) -> Self {
        TaskError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TaskError::NotFound(7), StatusCode::NOT_FOUND),
            (TaskError::Validation("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (TaskError::EmptyRequest("no ids".into()), StatusCode::BAD_REQUEST),
            (TaskError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_each_error_has_its_own_code() {
        let codes: Vec<_> = [
            TaskError::NotFound(1),
            TaskError::Validation("bad".into()),
            TaskError::EmptyRequest("no ids".into()),
            TaskError::Database("down".into()),
        ]
        .into_iter()
        .map(|err| AppError::from(err).error_code().as_str())
        .collect();

        assert_eq!(
            codes,
            ["NOT_FOUND", "VALIDATION_ERROR", "BAD_REQUEST", "DATABASE_ERROR"]
        );
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        let app: AppError = TaskError::NotFound(42).into();
        assert_eq!(app.to_string(), "Not Found: Task 42 not found");
    }

    #[test]
    fn test_db_err_becomes_database() {
        let err: TaskError = sea_orm::DbErr::Custom("connection reset".into()).into();
        assert!(matches!(err, TaskError::Database(msg) if msg.contains("connection reset")));
    }
}
