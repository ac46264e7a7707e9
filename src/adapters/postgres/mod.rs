//! PostgreSQL adapters - Database implementations for the persistence ports.
//!
//! - `PostgresProgressRepository` - Progress records and scenario scores
//! - `PostgresAccountRepository` - Account creation and cascading deletion

mod account_repository;
mod progress_repository;
mod rows;

pub use account_repository::PostgresAccountRepository;
pub use progress_repository::PostgresProgressRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Opens a connection pool with the configured limits.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
}

/// Applies the embedded schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
