//! Product business rules.
//!
//! Validates input, translates path identifiers into UUIDs, and maps
//! persistence errors into the domain errors the HTTP layer matches on.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::repository::{Product, Repository, RepositoryError};

/// Page size used when `limit` is missing or unusable.
pub const DEFAULT_LIMIT: i64 = 10;

/// Domain errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("product not found")]
    NotFound,

    #[error("invalid product ID")]
    InvalidId,

    #[error("name is required")]
    NameRequired,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

/// One page of products plus the total number of stored products.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
}

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, name: &str) -> Result<Product, ServiceError>;

    async fn get(&self, id: &str) -> Result<Product, ServiceError>;

    async fn update(&self, id: &str, name: &str) -> Result<Product, ServiceError>;

    /// Succeeds when `id` is well formed, whether or not the product exists.
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;

    /// Unusable `limit` or `offset` values fall back to 10 and 0.
    async fn list(
        &self,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<ProductPage, ServiceError>;
}

/// `ProductService` over an injected repository.
pub struct ProductManager {
    repo: Arc<dyn Repository<Product>>,
}

impl ProductManager {
    pub fn new(repo: Arc<dyn Repository<Product>>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ProductService for ProductManager {
    async fn create(&self, name: &str) -> Result<Product, ServiceError> {
        let name = require_name(name)?;
        let product = Product::new(name);
        self.repo.create(&product).await?;
        tracing::debug!(id = %product.id, "Product created");
        Ok(product)
    }

    async fn get(&self, id: &str) -> Result<Product, ServiceError> {
        let id = parse_id(id)?;
        Ok(self.repo.get_by_id(id).await?)
    }

    async fn update(&self, id: &str, name: &str) -> Result<Product, ServiceError> {
        let name = require_name(name)?;
        let id = parse_id(id)?;

        let mut product = self.repo.get_by_id(id).await?;
        product.rename(name);
        self.repo.update(&product).await?;
        Ok(product)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id)?;
        self.repo.delete(id).await?;
        Ok(())
    }

    async fn list(
        &self,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<ProductPage, ServiceError> {
        let limit = parse_limit(limit);
        let offset = parse_offset(offset);

        let items = self.repo.list(limit, offset).await?;
        let total = self.repo.count().await?;
        Ok(ProductPage { items, total })
    }
}

fn require_name(name: &str) -> Result<&str, ServiceError> {
    if name.is_empty() {
        return Err(ServiceError::NameRequired);
    }
    Ok(name)
}

fn parse_id(id: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(id).map_err(|_| ServiceError::InvalidId)
}

/// Positive integer, else `DEFAULT_LIMIT`.
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_LIMIT)
}

/// Non-negative integer, else 0.
pub fn parse_offset(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|offset| *offset >= 0)
        .unwrap_or(0)
}
