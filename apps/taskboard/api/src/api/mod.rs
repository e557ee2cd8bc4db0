use axum::Router;
use domain_tasks::{SqlTaskRepository, TaskService};

pub mod health;
pub mod index;

pub use health::ready_router;
pub use index::index_router;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// Returns a stateless Router (all sub-routers have state already applied).
pub fn routes(state: &crate::state::AppState) -> Router {
    let tasks = TaskService::new(SqlTaskRepository::new(state.db.clone()));

    Router::new().nest("/tasks", domain_tasks::handlers::router(tasks))
}
