//! Embedded schema migrations.

use sqlx::PgPool;
use tracing::info;

use chatdesk_core::error::{AppError, ErrorKind};
use chatdesk_core::result::AppResult;

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database schema up to date");
    Ok(())
}
