//! Schema migrations
//!
//! The workspace `migrations/` directory is embedded at compile time, so the
//! service binary does not need the source tree next to it at runtime.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply pending migrations. Returns the newest known schema version.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<i64, MigrateError> {
    MIGRATOR.run(pool).await?;
    Ok(MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0))
}
