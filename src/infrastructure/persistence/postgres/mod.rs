//! # PostgreSQL Repositories
//!
//! `sqlx` implementations of the repository ports. Queries are built at
//! runtime so the crate compiles without a live database.
//!
//! The schema lives in `migrations/` and is applied with [`migrate`].

pub mod application_repository;
pub mod offer_repository;

pub use application_repository::PostgresApplicationRepository;
pub use offer_repository::PostgresOfferRepository;

use crate::infrastructure::persistence::traits::{RepositoryError, RepositoryResult};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Opens a connection pool.
///
/// # Errors
///
/// Returns `RepositoryError::Connection` if the database is unreachable.
pub async fn connect(url: &str, max_connections: u32) -> RepositoryResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await
        .map_err(|e| RepositoryError::connection(e.to_string()))
}

/// Applies pending schema migrations.
///
/// # Errors
///
/// Returns `RepositoryError::Query` if a migration fails.
pub async fn migrate(pool: &PgPool) -> RepositoryResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))
}

/// Maps a driver error, turning unique violations into `Duplicate`.
pub(crate) fn map_sqlx_error(
    entity_type: &'static str,
    id: impl Into<String>,
    error: sqlx::Error,
) -> RepositoryError {
    match error {
        sqlx::Error::RowNotFound => RepositoryError::not_found(entity_type, id),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::duplicate(entity_type, id)
        }
        error @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
            RepositoryError::connection(error.to_string())
        }
        other => RepositoryError::query(other.to_string()),
    }
}
