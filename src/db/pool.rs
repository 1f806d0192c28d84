use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

pub async fn create_pool(url: &str, config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    // Test connection
    health_check(&pool).await?;

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> Result<bool> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(true)
}
