//! Product API service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ log_response ─▶ compression ─▶ stamp_headers ─▶ request_context
//!                                                                          │
//!                                                                          ▼
//!                                                              timeout ─▶ routes
//!                                                                          │
//!                                                                          ▼
//!                                                     handlers ─▶ ProductService
//!                                                                          │
//!                                                                          ▼
//!                                                       Repository<Product> (sqlx)
//!
//!     Startup: version → config → logging → bootstrap (env / Secret Manager)
//!              → repository → metrics → listener → run until SIGINT/SIGTERM
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use shop_api::lifecycle::startup;

#[derive(Parser)]
#[command(name = "shop-api")]
#[command(about = "HTTP API serving products", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "SHOP_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match startup::run(args.config.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Application error");
            eprintln!("shop-api: {e}");
            ExitCode::FAILURE
        }
    }
}
