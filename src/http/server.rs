//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Wrap the route table in the middleware chain
//! - Serve on a caller-supplied listener
//! - Drive `Initializing → Listening → ShuttingDown → Stopped`
//! - Drain in-flight requests on shutdown, bounded by `shutdown.timeout_secs`

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};
use tracing::Instrument;

use crate::config::ServiceConfig;
use crate::http::middleware::{log_response, request_context, stamp_headers, HeaderStamp};
use crate::http::routes::create_router;
use crate::lifecycle::LifecycleState;
use crate::observability::Logger;
use crate::service::ProductService;
use crate::version::Version;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub version: Version,
    pub products: Arc<dyn ProductService>,
    pub logger: Logger,
}

impl AppState {
    pub fn new(version: Version, products: Arc<dyn ProductService>, logger: Logger) -> Self {
        Self {
            version,
            products,
            logger,
        }
    }
}

/// Error type for running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// HTTP server for the product API.
pub struct HttpServer {
    router: Router,
    logger: Logger,
    drain_timeout: Duration,
    state: watch::Sender<LifecycleState>,
}

impl HttpServer {
    pub fn new(config: &ServiceConfig, state: AppState) -> Self {
        let logger = state.logger.clone();
        let router = Self::build_router(config, state);
        let (state, _) = watch::channel(LifecycleState::Initializing);

        Self {
            router,
            logger,
            drain_timeout: config.shutdown.timeout(),
            state,
        }
    }

    /// Build the router with the full middleware chain, outermost layer last.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let stamp = HeaderStamp::new(&state.version, state.logger.clone());

        create_router(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(middleware::from_fn(request_context))
            .layer(middleware::from_fn_with_state(stamp, stamp_headers))
            .layer(CompressionLayer::new())
            .layer(middleware::from_fn(log_response))
    }

    /// The fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Observe lifecycle transitions.
    pub fn state_watcher(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    ///
    /// A closed `shutdown` channel counts as a shutdown request. If draining
    /// exceeds the timeout the remaining connections are dropped; that is
    /// logged and still returns `Ok`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let logger = self.logger.with_server_info(addr.port());
        let drain_timeout = self.drain_timeout;
        let state = self.state;

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let app = self.router.into_make_service();
        let mut serve = tokio::spawn(
            async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = stop_rx.await;
                    })
                    .await
            }
            .instrument(logger.span().clone()),
        );

        state.send_replace(LifecycleState::Listening);
        logger.in_scope(|| tracing::info!(address = %addr, "HTTP server listening"));

        let watcher = tokio::spawn(
            watch_shutdown(serve, stop_tx, shutdown, state, drain_timeout)
                .instrument(logger.span().clone()),
        );

        watcher.await?
    }
}

/// Wait for a shutdown request, then stop accepting and drain within `drain_timeout`.
async fn watch_shutdown(
    mut serve: JoinHandle<std::io::Result<()>>,
    stop: oneshot::Sender<()>,
    mut shutdown: broadcast::Receiver<()>,
    state: watch::Sender<LifecycleState>,
    drain_timeout: Duration,
) -> Result<(), ServerError> {
    tokio::select! {
        _ = shutdown.recv() => {}
        result = &mut serve => {
            state.send_replace(LifecycleState::Stopped);
            tracing::warn!("HTTP server exited before shutdown was requested");
            return Ok(result??);
        }
    }

    state.send_replace(LifecycleState::ShuttingDown);
    tracing::info!(
        timeout_secs = drain_timeout.as_secs(),
        "Shutting down HTTP server"
    );
    let _ = stop.send(());

    let outcome = match tokio::time::timeout(drain_timeout, &mut serve).await {
        Ok(result) => result?.map_err(ServerError::from),
        Err(_) => {
            serve.abort();
            tracing::error!(
                timeout_secs = drain_timeout.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
            Ok(())
        }
    };

    state.send_replace(LifecycleState::Stopped);
    tracing::info!("HTTP server stopped");
    outcome
}
