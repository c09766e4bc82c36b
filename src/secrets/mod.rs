//! Secret retrieval.
//!
//! # Data Flow
//! ```text
//! Bootstrap (cloud environment)
//!     → SecretRepository::get_secret(project, secret_id, version)
//!         → gcp.rs: access token (static or metadata server)
//!         → GET /v1/projects/{p}/secrets/{s}/versions/{v}:access
//!         → base64 payload → UTF-8 value
//! ```

pub mod gcp;

use async_trait::async_trait;

pub use gcp::{GcpSecretRepository, TokenSource};

/// Version alias resolving to the newest enabled secret version.
pub const LATEST_VERSION: &str = "latest";

/// Error type for secret retrieval.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("{0} cannot be empty")]
    InvalidArgument(&'static str),

    #[error("secret manager request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("secret manager returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to obtain access token: {0}")]
    Token(String),

    #[error("malformed secret payload: {0}")]
    Payload(String),
}

/// Resolves named secrets from a managed secret store.
#[async_trait]
pub trait SecretRepository: Send + Sync {
    /// Fetch one secret version as text. An empty `version` means latest.
    async fn get_secret(
        &self,
        project: &str,
        secret_id: &str,
        version: &str,
    ) -> Result<String, SecretError>;
}
