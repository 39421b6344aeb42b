//! Postgres pool for the video record store

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tubely_core::Config;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
}

/// Connect to `DATABASE_URL` and bring the `videos` schema up to date.
///
/// Fails startup if the database is unreachable within the configured timeout
/// or a migration does not apply.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let start = std::time::Instant::now();
    let pool = pool_options(config)
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    let schema_version = tubely_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        schema_version = schema_version,
        duration_ms = start.elapsed().as_millis(),
        "Database ready"
    );

    Ok(pool)
}
