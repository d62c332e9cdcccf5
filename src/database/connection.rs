//! PostgreSQL connection
//!
//! Opens the pool and applies the migrations in `migrations/`.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Open the pool and bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    info!("🗄️ Connecting to {}", mask_database_url(&config.url));

    let pool = config
        .create_pool()
        .await
        .context("Could not connect to the database")?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Could not apply database migrations")?;

    info!("✅ Database migrations applied");
    Ok(())
}

/// Hide credentials before logging a database URL
fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
