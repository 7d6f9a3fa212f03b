use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::core::config::DatabaseConfig;

/// Builds the shared Postgres pool from the `DB_*` settings. Timeouts
/// and lifetimes come from the config's `Duration` accessors.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await?;

    tracing::debug!(
        "Postgres pool ready (max={}, min={})",
        config.max_connections,
        config.min_connections
    );
    Ok(pool)
}
