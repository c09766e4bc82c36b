//! Route handlers.

pub mod health;
pub mod products;

use crate::http::error::ApiError;

/// Catch-all for unmatched paths and methods.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
