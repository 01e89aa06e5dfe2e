use anyhow::{Context, Result};
use sqlx::{MySqlPool, mysql::MySqlPoolOptions};
use tracing::info;

const SCHEMA: &str = include_str!("../sql/schema.sql");

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Creates the tables that do not exist yet. Safe to run on every start.
async fn ensure_schema(pool: &MySqlPool) -> Result<()> {
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Schema statement failed: {statement}"))?;
    }

    info!("Database schema ready");
    Ok(())
}
