//! Completion logging and request metrics.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::observability::{metrics, Logger};

/// Log method, path, and the final status once the response is produced.
pub async fn log_response(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();

    let response = next.run(req).await;
    let status = response.status().as_u16();

    let logger = response
        .extensions()
        .get::<Logger>()
        .cloned()
        .unwrap_or_default()
        .with_response_info(status);

    logger.in_scope(|| {
        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
    });
    metrics::record_request(method.as_str(), status, start);

    response
}
