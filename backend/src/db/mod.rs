//! PostgreSQL pool and migrations
//!
//! Every pool knob comes from [`DatabaseConfig`], so deployments tune it
//! through `config/*.toml` or `MA__DATABASE__*` variables.

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Name reported to PostgreSQL in `pg_stat_activity`
const APPLICATION_NAME: &str = "mobile-auth";

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.effective_min_connections())
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
}

/// Connect a pool for the credential and token stores
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&config.url)?.application_name(APPLICATION_NAME);

    let pool = pool_options(config).connect_with(connect_options).await?;

    info!(
        max = config.max_connections,
        min = config.effective_min_connections(),
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Database pool created"
    );

    Ok(pool)
}

/// Apply `backend/migrations` (users, personal_access_tokens)
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}
