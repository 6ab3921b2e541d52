use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Open a small connection pool against the configured database.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("Failed to connect to Postgres. Is the database up and DATABASE_URL correct?")?;

    Ok(pool)
}
