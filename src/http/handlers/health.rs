//! Greeting and liveness endpoints.

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;

use crate::http::encoding::encode;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub status: &'static str,
    pub build: &'a str,
    pub branch: &'a str,
}

pub async fn hello() -> Result<Response, ApiError> {
    Ok(encode(
        StatusCode::OK,
        &HelloResponse {
            message: "Hello, World!",
        },
    )?)
}

pub async fn healthz(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(encode(
        StatusCode::OK,
        &HealthResponse {
            status: "ok",
            build: &state.version.build,
            branch: &state.version.branch,
        },
    )?)
}
