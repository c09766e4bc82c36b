//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Version → ServiceConfig → logging → Bootstrap → repository
//!     → metrics → bind listener → HttpServer::run
//!
//! Server (http/server.rs, states in state.rs):
//!     Initializing → Listening → ShuttingDown → Stopped
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has a timeout; a timed-out drain is logged, not fatal

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::Shutdown;
pub use startup::StartupError;
pub use state::LifecycleState;
