//! Request interceptors.
//!
//! # Data Flow
//! ```text
//! request
//!     → log_response      (timer; completion log + metrics on the way out)
//!     → CompressionLayer  (gzip/deflate when Accept-Encoding allows)
//!     → stamp_headers     (correlation id, request logger; X-Build/X-Branch out)
//!     → request_context   (logger enriched with method + path)
//!     → TimeoutLayer      (408 after the request deadline)
//!     → routes
//! ```
//!
//! # Design Decisions
//! - Per-request state lives in request/response extensions, never in the layers
//! - The request logger travels back out in the response extensions so the
//!   outermost stage logs with every field

pub mod context;
pub mod correlation;
pub mod logging;

use axum::http::HeaderName;

pub use context::request_context;
pub use correlation::{stamp_headers, HeaderStamp};
pub use logging::log_response;

/// Correlation id header, echoed or generated.
pub const X_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Build identifier response header.
pub const X_BUILD: HeaderName = HeaderName::from_static("x-build");

/// Branch name response header.
pub const X_BRANCH: HeaderName = HeaderName::from_static("x-branch");
