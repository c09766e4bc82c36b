//! Correlation id assignment and response header stamping.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use super::{X_BRANCH, X_BUILD, X_CORRELATION_ID};
use crate::observability::Logger;
use crate::version::Version;

/// Values stamped on every response plus the base logger requests derive from.
#[derive(Debug, Clone)]
pub struct HeaderStamp {
    build: HeaderValue,
    branch: HeaderValue,
    logger: Logger,
}

impl HeaderStamp {
    pub fn new(version: &Version, logger: Logger) -> Self {
        Self {
            build: header_value("build", &version.build),
            branch: header_value("branch", &version.branch),
            logger,
        }
    }
}

fn header_value(field: &'static str, value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| {
        tracing::warn!(field, value, "Version field is not a valid header value");
        HeaderValue::from_static("unknown")
    })
}

/// Assign the correlation id and stamp the version headers.
///
/// The id is written back into the request headers so later stages see it,
/// and a request logger carrying it is stored in the request extensions.
pub async fn stamp_headers(
    State(stamp): State<HeaderStamp>,
    mut req: Request,
    next: Next,
) -> Response {
    let correlation_id = correlation_id(req.headers());
    req.headers_mut()
        .insert(X_CORRELATION_ID, correlation_id.clone());

    let logger = stamp
        .logger
        .with_correlation_id(correlation_id.to_str().unwrap_or_default());
    req.extensions_mut().insert(logger.clone());

    let mut response = next.run(req).instrument(logger.span().clone()).await;

    if response.extensions().get::<Logger>().is_none() {
        response.extensions_mut().insert(logger);
    }

    let headers = response.headers_mut();
    headers.insert(X_CORRELATION_ID, correlation_id);
    headers.insert(X_BUILD, stamp.build);
    headers.insert(X_BRANCH, stamp.branch);
    response
}

/// The inbound id when present and printable, else a new UUID v4.
fn correlation_id(headers: &HeaderMap) -> HeaderValue {
    headers
        .get(X_CORRELATION_ID)
        .filter(|value| !value.is_empty() && value.to_str().is_ok())
        .cloned()
        .unwrap_or_else(new_correlation_id)
}

fn new_correlation_id() -> HeaderValue {
    let mut buf = Uuid::encode_buffer();
    let id = Uuid::new_v4().hyphenated().encode_lower(&mut buf);
    HeaderValue::from_str(id).expect("hyphenated UUID is a valid header value")
}
