//! Generic persistence.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig
//!     → connect(): driver chosen by URL scheme (or Params → PostgreSQL)
//!         → postgres.rs / sqlite.rs: pool + idempotent migration
//!     → Arc<dyn Repository<Product>>
//!         → service layer
//! ```
//!
//! # Design Decisions
//! - `Repository<T>` is the storage capability; drivers are injected, not inherited
//! - Deleting an absent row is not an error
//! - `list` is ordered by creation time, then id, so pages are stable

pub mod models;
pub mod postgres;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{DatabaseConfig, DatabaseSettings};

pub use models::Product;
pub use postgres::PostgresRepository;
pub use sqlite::SqliteRepository;

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unsupported database URL scheme: {0}")]
    UnsupportedUrl(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// CRUD storage for one entity type.
#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn create(&self, entity: &T) -> RepositoryResult<()>;

    /// Fails with `RepositoryError::NotFound` when no row has `id`.
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<T>;

    /// Fails with `RepositoryError::NotFound` when the row no longer exists.
    async fn update(&self, entity: &T) -> RepositoryResult<()>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<T>>;

    async fn count(&self) -> RepositoryResult<i64>;
}

/// Open the product repository described by `config`.
pub async fn connect(
    config: &DatabaseConfig,
    settings: &DatabaseSettings,
) -> RepositoryResult<Arc<dyn Repository<Product>>> {
    let repo: Arc<dyn Repository<Product>> = match config {
        DatabaseConfig::Url(url) => {
            let scheme = url.split(':').next().unwrap_or_default();
            match scheme {
                "postgres" | "postgresql" => {
                    Arc::new(PostgresRepository::from_url(url, settings.max_connections).await?)
                }
                "sqlite" => Arc::new(SqliteRepository::from_url(url).await?),
                other => return Err(RepositoryError::UnsupportedUrl(other.to_string())),
            }
        }
        DatabaseConfig::Params {
            host,
            port,
            name,
            user,
            password,
            ssl_mode,
        } => Arc::new(
            PostgresRepository::from_params(
                host,
                *port,
                name,
                user.as_deref(),
                password.as_deref(),
                *ssl_mode,
                settings.max_connections,
            )
            .await?,
        ),
    };
    Ok(repo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_sqlite_url() {
        let repo = connect(
            &DatabaseConfig::Url("sqlite::memory:".to_string()),
            &DatabaseSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_scheme() {
        let result = connect(
            &DatabaseConfig::Url("mysql://localhost/shop".to_string()),
            &DatabaseSettings::default(),
        )
        .await;

        match result {
            Err(RepositoryError::UnsupportedUrl(scheme)) => assert_eq!(scheme, "mysql"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("mysql should be rejected"),
        }
    }
}
