use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult};

/// Runs `SELECT 1` against whichever backend the connection uses.
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    let backend = db.get_database_backend();
    let stmt = Statement::from_string(backend, "SELECT 1".to_owned());

    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(format!("{backend:?}: {e}")))?;

    debug!(?backend, "Database health check passed");
    Ok(())
}
