//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     ServerConfig → bind listener → wrap routes → spawn serving task
//!
//! Signals (signals.rs):
//!     handlers installed before bind → SIGINT/SIGTERM → caller fires the
//!     Shutdown token
//!
//! Shutdown (shutdown.rs):
//!     token fired → stop accepting → drain connections → Stopped
//!                                  └ deadline elapsed → abort → ForcedStop
//! ```
//!
//! # Design Decisions
//! - The shutdown token is created by the caller and passed explicitly
//! - Shutdown has a hard deadline; outstanding work is abandoned after it
//! - Only bind failure and drain timeout escape to the process boundary

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

use std::future::Future;

use axum::Router;

use crate::config::ServerConfig;

pub use shutdown::{Shutdown, ShutdownError, ShutdownSignal};
pub use signals::{wait_for_signal, ShutdownReason, SignalListener};
pub use startup::{start, ServerHandle, StartError};
pub use state::{Phase, PhaseTracker};

/// Failures that end the process with a non-zero exit code.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Start(#[from] StartError),

    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

impl LifecycleError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Serve until SIGINT or SIGTERM, then shut down gracefully.
///
/// The signal handlers are registered before the port is bound, so a
/// signal that arrives during startup still leads to a graceful drain.
pub async fn run(config: &ServerConfig, routes: Router) -> Result<(), LifecycleError> {
    let mut signals = SignalListener::install();
    run_until(config, routes, async move {
        let reason = signals.recv().await;
        tracing::info!(signal = %reason, "Received shutdown signal");
    })
    .await
}

/// Serve until `signal` resolves, then shut down within
/// `config.shutdown_deadline`.
pub async fn run_until<F>(
    config: &ServerConfig,
    routes: Router,
    signal: F,
) -> Result<(), LifecycleError>
where
    F: Future<Output = ()>,
{
    let shutdown = Shutdown::new();
    let handle = start(config, routes, &shutdown).await?;

    signal.await;

    handle.shutdown(config.shutdown_deadline).await?;
    Ok(())
}
