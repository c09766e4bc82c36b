//! Startup orchestration.
//!
//! # Responsibilities
//! - Load build metadata and configuration
//! - Install logging, then resolve database credentials
//! - Connect the repository and wire the service into the HTTP server
//! - Bind the listener last and run until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::{AddrParseError, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Bootstrap, ConfigError, ProcessEnv, ServiceConfig, VariableSource, LOCAL_ENV};
use crate::http::{AppState, HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{self, Logger, LoggingError};
use crate::repository::{self, RepositoryError};
use crate::secrets::{GcpSecretRepository, SecretError, SecretRepository};
use crate::service::ProductManager;
use crate::version::{Version, VersionError};

/// Fatal startup errors.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("failed to create secret manager client: {0}")]
    Secrets(#[from] SecretError),

    #[error("failed to connect to database: {0}")]
    Repository(#[from] RepositoryError),

    #[error("invalid metrics address {address:?}: {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Start the service and run until SIGINT/SIGTERM.
pub async fn run(config_path: Option<&Path>) -> Result<(), StartupError> {
    let version = Version::load()?;
    let vars: Arc<dyn VariableSource> = Arc::new(ProcessEnv);

    let config = ServiceConfig::load(config_path, vars.as_ref())?;
    observability::init_logging(&config.observability)?;

    let logger = Logger::new(&version);
    logger.in_scope(|| tracing::info!(version = env!("CARGO_PKG_VERSION"), "shop-api starting"));

    let secrets = secret_repository(vars.as_ref())?;
    let app_config = Bootstrap::new(vars, secrets).load().await?;
    tracing::info!(
        env = %app_config.env,
        database = ?app_config.database,
        "Runtime configuration resolved"
    );

    let repo = repository::connect(&app_config.database, &config.database).await?;
    let products = Arc::new(ProductManager::new(repo));

    if config.observability.metrics_enabled {
        let address: SocketAddr = config.observability.metrics_address.parse().map_err(|source| {
            StartupError::MetricsAddress {
                address: config.observability.metrics_address.clone(),
                source,
            }
        })?;
        observability::metrics::init_metrics(address)?;
    }

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    signals::forward(shutdown);

    let state = AppState::new(version, products, logger);
    HttpServer::new(&config, state).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// The Secret Manager client, outside the local environment only.
fn secret_repository(
    vars: &dyn VariableSource,
) -> Result<Option<Arc<dyn SecretRepository>>, SecretError> {
    if vars.var("ENV").as_deref() == Some(LOCAL_ENV) {
        return Ok(None);
    }
    let repo: Arc<dyn SecretRepository> = Arc::new(GcpSecretRepository::from_env(vars)?);
    Ok(Some(repo))
}
