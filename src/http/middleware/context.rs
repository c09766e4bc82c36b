//! Request-scoped logger propagation.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::observability::Logger;

/// Enrich the request logger with method and path.
///
/// The enriched logger replaces the one in the request extensions and is
/// attached to the response for the completion log.
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let logger = req
        .extensions()
        .get::<Logger>()
        .cloned()
        .unwrap_or_default()
        .with_request_info(req.method().as_str(), req.uri().path());
    req.extensions_mut().insert(logger.clone());

    let mut response = next.run(req).instrument(logger.span().clone()).await;
    response.extensions_mut().insert(logger);
    response
}

/// Handlers take the request logger as an argument.
///
/// Requests that bypassed the middleware get `Logger::default()`.
impl<S> FromRequestParts<S> for Logger
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Logger>().cloned().unwrap_or_default())
    }
}
