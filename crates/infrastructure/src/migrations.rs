use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use agrinova_core::{AppError, AppResult};

/// Embedded schema migrations for the RBAC tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies pending migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    info!(migrations = MIGRATOR.iter().count(), "database migrations applied");
    Ok(())
}
