//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ObservabilityConfig
//!     → logging.rs (install tracing subscriber, JSON or pretty)
//!     → metrics.rs (optional Prometheus exporter)
//!
//! Per request:
//!     base Logger (build, branch)
//!     → with_correlation_id  (header middleware)
//!     → with_request_info    (request context middleware)
//!     → with_response_info   (response logging middleware)
//!     → metrics::record_request
//! ```
//!
//! # Design Decisions
//! - The base logger is constructed once and passed in; nothing is stored globally
//!   besides the tracing dispatcher itself
//! - Derived loggers are new values; a logger is never mutated after creation
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFields, Logger, LoggingError};
