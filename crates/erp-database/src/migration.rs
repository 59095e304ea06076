//! Embedded schema migrations.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use erp_core::error::{AppError, ErrorKind};

/// Migrations under the workspace `migrations/` directory, embedded at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(known = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Database migrations completed");
    Ok(())
}
