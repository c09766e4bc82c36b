//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TcpListener
//!     → server.rs (axum::serve, lifecycle, graceful drain)
//!     → middleware/ (logging, compression, headers, request context, timeout)
//!     → routes.rs (exact verb + path table)
//!     → handlers/ (decode → service → encode)
//! ```

pub mod encoding;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use encoding::{decode, encode, DecodeError, EncodeError, JsonBody};
pub use error::ApiError;
pub use middleware::{X_BRANCH, X_BUILD, X_CORRELATION_ID};
pub use routes::create_router;
pub use server::{AppState, HttpServer, ServerError};
