//! Schema definitions and migration utilities.
//!
//! The SQL lives in `migrations/` and is embedded at compile time.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the users and notes tables (001_init.sql).
pub const INIT_MIGRATION: &str = include_str!("../migrations/001_init.sql");

/// Run all migrations against the database.
///
/// This function is idempotent - every statement checks for existing
/// objects before creating them.
///
/// # Errors
///
/// Returns an error if any migration fails to execute.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    tracing::debug!("Running init migration (001_init.sql)...");
    sqlx::raw_sql(INIT_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Migration(format!("Init migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if both the `users` and `notes` tables exist.
pub async fn is_schema_initialized(pool: &PgPool) -> StoreResult<bool> {
    let result: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)::bigint
        FROM information_schema.tables
        WHERE table_schema = 'public'
        AND table_name IN ('users', 'notes')
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(result.0 == 2)
}
