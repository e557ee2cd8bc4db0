//! Shared application state passed to routers and readiness checks.

use sea_orm::DatabaseConnection;

/// Cloned per handler; the connection is a shared pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// Task store connection pool
    pub db: DatabaseConnection,
}
