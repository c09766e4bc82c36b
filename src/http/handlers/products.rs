//! Product CRUD handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::http::encoding::{encode, JsonBody};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::Logger;

/// Body of create and update requests. A missing or null name reads as empty.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub name: Option<String>,
}

impl ProductRequest {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Raw pagination parameters. Parsing and defaults belong to the service.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    logger: Logger,
    JsonBody(request): JsonBody<ProductRequest>,
) -> Result<Response, ApiError> {
    let product = state
        .products
        .create(request.name())
        .await
        .map_err(|e| ApiError::from_service(e, "failed to create product"))?;

    tracing::info!(parent: logger.span(), id = %product.id, "Product created");
    Ok(encode(StatusCode::CREATED, &product)?)
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let product = state
        .products
        .get(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "failed to get product"))?;

    Ok(encode(StatusCode::OK, &product)?)
}

pub async fn update(
    State(state): State<AppState>,
    logger: Logger,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ProductRequest>,
) -> Result<Response, ApiError> {
    let product = state
        .products
        .update(&id, request.name())
        .await
        .map_err(|e| ApiError::from_service(e, "failed to update product"))?;

    tracing::info!(parent: logger.span(), id = %product.id, "Product updated");
    Ok(encode(StatusCode::OK, &product)?)
}

pub async fn delete(
    State(state): State<AppState>,
    logger: Logger,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state
        .products
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "failed to delete product"))?;

    tracing::info!(parent: logger.span(), id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let page = state
        .products
        .list(params.limit.as_deref(), params.offset.as_deref())
        .await
        .map_err(|e| ApiError::from_service(e, "failed to list products"))?;

    Ok(encode(StatusCode::OK, &page)?)
}
