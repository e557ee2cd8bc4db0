use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::sql::{connect_from_config_with_retry, run_migrations};
use eyre::WrapErr;
use migration::Migrator;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    info!(backend = ?config.database.backend(), "Connecting to task store");
    let db = connect_from_config_with_retry(config.database.clone(), config.retry.clone())
        .await
        .wrap_err("Database connection failed")?;

    if config.database.run_migrations {
        run_migrations::<Migrator>(&db, config.app.name)
            .await
            .wrap_err("Database migrations failed")?;
    }

    let state = AppState { config, db };
    let server_config = state.config.server.clone();

    // Build router with API routes (pass reference, not ownership!)
    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = create_router::<openapi::ApiDoc>(api_routes, &server_config)?;

    // - /: endpoint index
    // - /health: liveness check with app name/version
    // - /ready: readiness check that pings the database
    let app = router
        .merge(api::index_router(state.config.app.clone()))
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!(
        shutdown_timeout = ?server_config.shutdown_timeout,
        "Starting taskboard API with graceful shutdown"
    );

    create_production_app(app, &server_config, async move {
        info!("Shutting down: closing database connections");
        match state.db.close().await {
            Ok(()) => info!("Database connection closed successfully"),
            Err(e) => tracing::error!("Error closing database: {}", e),
        }
    })
    .await
    .wrap_err("Server error")?;

    info!("Taskboard API shutdown complete");
    Ok(())
}
