//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize, ServiceConfig defaults)
//!     → env overrides (PORT)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! environment (ENV, DATABASE_URL, DB_*, GCP_*)
//!     → bootstrap.rs
//!         local: credentials from DB_USER / DB_PASSWORD
//!         cloud: credentials from the secret repository
//!     → AppConfig { env, database }
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow an empty or absent config file
//! - Validation separates syntactic (serde) from semantic checks
//! - Environment access goes through `VariableSource` so bootstrap is testable

pub mod bootstrap;
pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use bootstrap::{
    AppConfig, Bootstrap, DatabaseConfig, SecretCoordinates, Secrets, SslMode, LOCAL_ENV,
};
pub use env::{ProcessEnv, VariableSource};
pub use loader::{load_config, ConfigError};
pub use schema::{
    DatabaseSettings, LimitConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ServiceConfig, ShutdownConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
