//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! vitrina-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - direct `PostgreSQL` connection string for the hosted
//!   database (not the REST URL)
//!
//! # Migration Files
//!
//! `crates/admin/migrations/`: the `owners`, `tenants` and `products` tables
//! and their row-level security policies. The storefront only reads these
//! tables, so there is a single migration set.

use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns [`MigrationError`] if `DATABASE_URL` is unset, the connection
/// fails, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| MigrationError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
