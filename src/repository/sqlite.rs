//! SQLite product repository. Used for local development and tests.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use super::{Product, Repository, RepositoryError, RepositoryResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS product (
    id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

pub struct SqliteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRepository {
    /// Open `url` (`sqlite::memory:` or `sqlite:<path>`), creating the file if needed.
    pub async fn from_url(url: &str) -> RepositoryResult<Self> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // One connection that never expires: an in-memory database lives as
        // long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    /// Fresh in-memory database.
    pub async fn in_memory() -> RepositoryResult<Self> {
        Self::from_url("sqlite::memory:").await
    }

    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Repository<Product> for SqliteRepository {
    async fn create(&self, product: &Product) -> RepositoryResult<()> {
        sqlx::query("INSERT INTO product (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(product.id)
            .bind(&product.name)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Product> {
        sqlx::query_as::<_, Product>(
            "SELECT id, name, created_at, updated_at FROM product WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, product: &Product) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE product SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&product.name)
            .bind(product.updated_at)
            .bind(product.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            "SELECT id, name, created_at, updated_at FROM product \
             ORDER BY created_at, id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
