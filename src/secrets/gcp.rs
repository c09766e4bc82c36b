//! Google Cloud Secret Manager client over the REST API.

use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde::Deserialize;

use super::{SecretError, SecretRepository, LATEST_VERSION};
use crate::config::env::VariableSource;

/// Public Secret Manager endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://secretmanager.googleapis.com";

/// Token endpoint of the GCE/Cloud Run metadata server.
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Where bearer tokens come from.
#[derive(Clone)]
pub enum TokenSource {
    /// A pre-issued access token.
    Static(String),
    /// The instance metadata server (default service account).
    MetadataServer { url: String },
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("Static(<redacted>)"),
            TokenSource::MetadataServer { url } => {
                f.debug_struct("MetadataServer").field("url", url).finish()
            }
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Deserialize)]
struct SecretPayload {
    data: String,
}

/// Secret repository backed by Google Cloud Secret Manager.
#[derive(Debug, Clone)]
pub struct GcpSecretRepository {
    client: reqwest::Client,
    endpoint: String,
    token_source: TokenSource,
}

impl GcpSecretRepository {
    /// Client for the public endpoint.
    pub fn new(token_source: TokenSource) -> Result<Self, SecretError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, token_source)
    }

    /// Client for a custom endpoint (emulators, tests).
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        token_source: TokenSource,
    ) -> Result<Self, SecretError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token_source,
        })
    }

    /// Static token from `GCP_ACCESS_TOKEN` when set, metadata server otherwise.
    pub fn from_env(vars: &dyn VariableSource) -> Result<Self, SecretError> {
        let token_source = match vars.var("GCP_ACCESS_TOKEN") {
            Some(token) => TokenSource::Static(token),
            None => TokenSource::MetadataServer {
                url: METADATA_TOKEN_URL.to_string(),
            },
        };
        Self::new(token_source)
    }

    async fn access_token(&self) -> Result<String, SecretError> {
        match &self.token_source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::MetadataServer { url } => {
                let response = self
                    .client
                    .get(url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SecretError::Token(format!(
                        "metadata server returned status {}",
                        status.as_u16()
                    )));
                }
                let token: TokenResponse = response.json().await?;
                Ok(token.access_token)
            }
        }
    }
}

#[async_trait]
impl SecretRepository for GcpSecretRepository {
    async fn get_secret(
        &self,
        project: &str,
        secret_id: &str,
        version: &str,
    ) -> Result<String, SecretError> {
        if project.is_empty() {
            return Err(SecretError::InvalidArgument("project number"));
        }
        if secret_id.is_empty() {
            return Err(SecretError::InvalidArgument("secret id"));
        }
        let version = if version.is_empty() {
            LATEST_VERSION
        } else {
            version
        };

        let name = format!("projects/{project}/secrets/{secret_id}/versions/{version}");
        let url = format!("{}/v1/{}:access", self.endpoint, name);
        tracing::debug!(secret = %name, "Accessing secret version");

        let token = self.access_token().await?;
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SecretError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let access: AccessSecretVersionResponse = response.json().await?;
        let bytes = BASE64_STANDARD
            .decode(access.payload.data.as_bytes())
            .map_err(|e| SecretError::Payload(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| SecretError::Payload(e.to_string()))
    }
}
