//! Structured logging.
//!
//! `Logger` carries the log context of one scope (the process, the server, or a
//! single request) as a `tracing` span plus a typed copy of its fields. Events
//! emitted inside the span, or inside a future instrumented with it, carry every
//! field of the span and its parents.

use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};
use crate::version::Version;

/// Error type for logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the process-wide tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let (json, pretty) = match config.log_format {
        LogFormat::Json => (
            Some(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            ),
            None,
        ),
        LogFormat::Pretty => (None, Some(fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()?;

    Ok(())
}

/// Typed view of the fields attached to a logger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFields {
    pub build: Option<String>,
    pub branch: Option<String>,
    pub port: Option<u16>,
    pub correlation_id: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub status_code: Option<u16>,
}

/// Immutable log context.
///
/// `Logger::default()` is the fallback used when a request carries no logger:
/// it has no fields, and its events go straight to the installed subscriber.
#[derive(Debug, Clone)]
pub struct Logger {
    span: Span,
    fields: LogFields,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            span: Span::none(),
            fields: LogFields::default(),
        }
    }
}

impl Logger {
    /// Create the base logger with the permanent build fields.
    pub fn new(version: &Version) -> Self {
        let span = tracing::info_span!(
            parent: None,
            "service",
            build = %version.build,
            branch = %version.branch,
        );
        Self {
            span,
            fields: LogFields {
                build: Some(version.build.clone()),
                branch: Some(version.branch.clone()),
                ..LogFields::default()
            },
        }
    }

    pub fn with_server_info(&self, port: u16) -> Self {
        let span = tracing::info_span!(parent: &self.span, "server", port);
        self.derive(span, |fields| fields.port = Some(port))
    }

    pub fn with_correlation_id(&self, correlation_id: &str) -> Self {
        let span = tracing::info_span!(parent: &self.span, "request", correlation_id = %correlation_id);
        self.derive(span, |fields| {
            fields.correlation_id = Some(correlation_id.to_owned())
        })
    }

    pub fn with_request_info(&self, method: &str, path: &str) -> Self {
        let span = tracing::info_span!(parent: &self.span, "http", method = %method, path = %path);
        self.derive(span, |fields| {
            fields.method = Some(method.to_owned());
            fields.path = Some(path.to_owned());
        })
    }

    pub fn with_response_info(&self, status_code: u16) -> Self {
        let span = tracing::info_span!(parent: &self.span, "response", status_code);
        self.derive(span, |fields| fields.status_code = Some(status_code))
    }

    /// The span backing this logger. Instrument futures with a clone of it.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn fields(&self) -> &LogFields {
        &self.fields
    }

    /// Run `f` with this logger's span entered.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }

    fn derive(&self, span: Span, update: impl FnOnce(&mut LogFields)) -> Self {
        let mut fields = self.fields.clone();
        update(&mut fields);
        Self { span, fields }
    }
}
