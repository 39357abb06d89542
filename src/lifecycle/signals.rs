//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and SIGTERM both request a graceful shutdown. Handlers
//! are registered when a [`SignalListener`] is installed, not when it is
//! first awaited, so install it before binding: a signal that arrives
//! while the server is starting is then queued instead of killing the
//! process.

use std::fmt;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Which OS signal asked the process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => f.write_str("SIGINT"),
            ShutdownReason::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Registered SIGINT/SIGTERM handlers.
///
/// A handler that failed to install is `None`; its branch never completes
/// and the other signal still works.
#[derive(Debug)]
pub struct SignalListener {
    #[cfg(unix)]
    interrupt: Option<Signal>,
    #[cfg(unix)]
    terminate: Option<Signal>,
    #[cfg(windows)]
    ctrl_c: Option<tokio::signal::windows::CtrlC>,
}

impl SignalListener {
    /// Register the handlers now. Must be called inside a tokio runtime.
    pub fn install() -> Self {
        #[cfg(unix)]
        {
            Self {
                interrupt: register(SignalKind::interrupt(), ShutdownReason::Interrupt),
                terminate: register(SignalKind::terminate(), ShutdownReason::Terminate),
            }
        }

        #[cfg(windows)]
        {
            let ctrl_c = match tokio::signal::windows::ctrl_c() {
                Ok(ctrl_c) => Some(ctrl_c),
                Err(err) => {
                    tracing::error!(error = %err, "Failed to install Ctrl+C handler");
                    None
                }
            };
            Self { ctrl_c }
        }

        #[cfg(not(any(unix, windows)))]
        {
            Self {}
        }
    }

    /// Wait for the next SIGINT or SIGTERM.
    pub async fn recv(&mut self) -> ShutdownReason {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = next(&mut self.interrupt) => ShutdownReason::Interrupt,
                _ = next(&mut self.terminate) => ShutdownReason::Terminate,
            }
        }

        #[cfg(windows)]
        {
            if let Some(ctrl_c) = self.ctrl_c.as_mut() {
                if ctrl_c.recv().await.is_some() {
                    return ShutdownReason::Interrupt;
                }
            }
            std::future::pending().await
        }

        #[cfg(not(any(unix, windows)))]
        {
            std::future::pending().await
        }
    }
}

#[cfg(unix)]
fn register(kind: SignalKind, reason: ShutdownReason) -> Option<Signal> {
    match signal(kind) {
        Ok(stream) => Some(stream),
        Err(err) => {
            tracing::error!(signal = %reason, error = %err, "Failed to install signal handler");
            None
        }
    }
}

/// Resolves on the next delivery; never resolves without a handler.
#[cfg(unix)]
async fn next(stream: &mut Option<Signal>) {
    if let Some(stream) = stream.as_mut() {
        if stream.recv().await.is_some() {
            return;
        }
    }
    std::future::pending::<()>().await
}

/// Install the handlers and wait until SIGINT or SIGTERM arrives.
///
/// Signals delivered before this is first polled are not observed; use
/// [`SignalListener::install`] ahead of startup when that matters.
pub async fn wait_for_signal() -> ShutdownReason {
    SignalListener::install().recv().await
}
