//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::encoding::EncodeError;
use crate::service::ServiceError;

/// Error body: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors returned by handlers.
///
/// Only the message reaches the client; internal causes are logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("{message}: {source}")]
    Internal {
        message: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ApiError {
    pub fn invalid_body() -> Self {
        ApiError::BadRequest("invalid request body".to_string())
    }

    /// Map a service error; `action` names the failed operation in 500 bodies.
    pub fn from_service(err: ServiceError, action: &'static str) -> Self {
        match err {
            ServiceError::NameRequired | ServiceError::InvalidId => {
                ApiError::BadRequest(err.to_string())
            }
            ServiceError::NotFound => ApiError::NotFound(err.to_string()),
            ServiceError::Repository(_) => ApiError::Internal {
                message: action,
                source: err,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal { .. } | ApiError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Internal { message, .. } => (*message).to_string(),
            ApiError::Encode(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::from_service(err, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
