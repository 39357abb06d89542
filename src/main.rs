//! Auth Service
//!
//! # Architecture Overview
//!
//! ```text
//!    env (PORT, GIN_MODE)
//!          │
//!          ▼
//!     ┌─────────┐   ┌───────────────┐   ┌──────────────────────────────┐
//!     │ config  │──▶│  lifecycle    │──▶│ net listener (serving task)  │
//!     └─────────┘   │ start/signal/ │   │   → connection (timeouts)    │
//!                   │   shutdown    │   │   → http middleware → routes │
//!                   └───────────────┘   └──────────────────────────────┘
//!                          ▲
//!                  SIGINT / SIGTERM
//! ```
//!
//! Exit code 0 after a graceful drain, 1 when the port cannot be bound or
//! in-flight requests outlive the shutdown deadline.

use std::process::ExitCode;

use auth_service::config::ServerConfig;
use auth_service::http::api;
use auth_service::{lifecycle, observability};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::from_env();
    observability::logging::init(&config.mode);

    match lifecycle::run(&config, api::router()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Auth service terminated");
            ExitCode::from(err.exit_code())
        }
    }
}
