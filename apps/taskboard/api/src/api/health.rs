//! Readiness check against the task store.

use crate::state::AppState;
use axum::{Router, extract::State, response::Response, routing::get};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

/// Readiness check endpoint that pings the database.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let database: HealthCheckFuture<'_> = Box::pin(async {
        database::sql::check_health(&state.db)
            .await
            .map_err(|e| format!("Database ping failed: {}", e))
    });

    run_health_checks(vec![("database", database)]).await
}

/// Router exposing `GET /ready`.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(state)
}
