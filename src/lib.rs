//! Product API service library.
//!
//! A small HTTP service: greeting and liveness endpoints plus CRUD for
//! products, with correlation ids, structured request logging, response
//! compression, and graceful shutdown.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod repository;
pub mod secrets;
pub mod service;
pub mod version;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use version::Version;
