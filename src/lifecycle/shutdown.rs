//! Shutdown coordination.
//!
//! `Shutdown` is the cancellation token created by whoever drives the
//! process. The serving path holds a `ShutdownSignal` subscribed from it;
//! the shutdown path triggers it and then bounds the drain with a deadline.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinError;

use crate::lifecycle::startup::ServerHandle;
use crate::lifecycle::state::Phase;

/// Trigger side of the shutdown token.
///
/// Cheap to clone; every clone fires the same token.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create an unfired token.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to the shutdown signal.
    ///
    /// A subscriber created after the token fired observes it immediately.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the token. Returns `true` only for the call that fired it.
    pub fn trigger(&self) -> bool {
        !self.tx.send_replace(true)
    }

    /// Whether the token has fired.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receive side of the shutdown token.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once the token has fired.
    ///
    /// Dropping every `Shutdown` without firing also resolves this.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|fired| *fired).await;
    }

    /// Whether the token has fired, without waiting.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Why a shutdown did not end in a clean drain.
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("server forced to shutdown: {abandoned} connection(s) still open after {deadline:?}")]
    DeadlineExceeded { deadline: Duration, abandoned: u64 },

    #[error("serving task failed: {0}")]
    ServeTask(#[from] JoinError),
}

impl ServerHandle {
    /// Stop accepting, drain in-flight requests, and tear down.
    ///
    /// Returns `DeadlineExceeded` when connections are still open once
    /// `deadline` elapses; those connections are aborted.
    pub async fn shutdown(self, deadline: Duration) -> Result<(), ShutdownError> {
        let ServerHandle {
            mut task,
            shutdown,
            phase,
            connections,
            ..
        } = self;

        tracing::info!(
            deadline_ms = deadline.as_millis() as u64,
            open_connections = connections.active_count(),
            "Shutting down server"
        );
        shutdown.trigger();

        let outcome = match tokio::time::timeout(deadline, &mut task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ShutdownError::ServeTask(err)),
            Err(_) => {
                let abandoned = connections.active_count();
                task.abort();
                let _ = task.await;
                Err(ShutdownError::DeadlineExceeded {
                    deadline,
                    abandoned,
                })
            }
        };

        if phase.current() == Phase::Serving {
            phase.advance(Phase::Draining);
        }

        match &outcome {
            Ok(()) => {
                phase.advance(Phase::Stopped);
                tracing::info!("Server exited gracefully");
            }
            Err(err) => {
                phase.advance(Phase::ForcedStop);
                tracing::error!(error = %err, "Server forced to shutdown");
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_is_idempotent() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());
        assert!(shutdown.trigger());
        assert!(!shutdown.trigger());
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn subscribers_observe_trigger() {
        let shutdown = Shutdown::new();
        let mut early = shutdown.subscribe();

        let waiter = tokio::spawn(async move {
            early.recv().await;
        });

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("subscriber not woken")
            .unwrap();
    }

    #[tokio::test]
    async fn late_subscriber_sees_fired_token() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut late = shutdown.subscribe();
        assert!(late.is_triggered());
        tokio::time::timeout(Duration::from_millis(100), late.recv())
            .await
            .expect("late subscriber should resolve immediately");
    }

    #[tokio::test]
    async fn dropped_token_releases_subscribers() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_millis(100), signal.recv())
            .await
            .expect("dropped token should resolve");
    }
}
