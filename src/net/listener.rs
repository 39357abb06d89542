//! TCP listener and accept loop.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept connections until the shutdown signal fires
//! - Own every connection task, so aborting the loop abandons them all
//! - Drain: close the listener first, then wait for open connections

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::config::TimeoutConfig;
use crate::lifecycle::{Phase, PhaseTracker, ShutdownSignal};
use crate::net::connection::{serve_connection, ConnectionTracker};

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind a TCP listener to `address` (`host:port`).
    pub async fn bind(address: &str) -> io::Result<Self> {
        let inner = TcpListener::bind(address).await?;
        let local_addr = inner.local_addr()?;

        tracing::debug!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Get the actual bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the accept loop, then drain.
    ///
    /// Returns once the signal has fired and every accepted connection has
    /// closed. The listening socket is dropped before `Draining` is
    /// published, so no connection is accepted after that point.
    pub async fn serve(
        self,
        app: Router,
        timeouts: TimeoutConfig,
        mut shutdown: ShutdownSignal,
        phase: PhaseTracker,
        tracker: ConnectionTracker,
    ) {
        let Listener { inner, local_addr } = self;
        let builder = Arc::new(connection_builder(&timeouts));
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => break,

                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(err) = joined {
                        if err.is_panic() {
                            tracing::error!(error = %err, "Connection task panicked");
                        }
                    }
                }

                accepted = inner.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(err) = stream.set_nodelay(true) {
                            tracing::trace!(error = %err, "Failed to set TCP_NODELAY");
                        }
                        let guard = tracker.track();
                        tracing::debug!(
                            connection_id = %guard.id(),
                            peer_addr = %peer,
                            open_connections = tracker.active_count(),
                            "Connection accepted"
                        );
                        connections.spawn(serve_connection(
                            stream,
                            peer,
                            app.clone(),
                            Arc::clone(&builder),
                            timeouts.idle,
                            shutdown.clone(),
                            guard,
                        ));
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        drop(inner);
        phase.advance(Phase::Draining);
        tracing::info!(
            address = %local_addr,
            open_connections = tracker.active_count(),
            "Listener closed, draining connections"
        );

        while connections.join_next().await.is_some() {}
        tracing::debug!("All connections drained");
    }
}

/// HTTP/1 and HTTP/2 connection builder with the read timeout applied.
///
/// HTTP/1 bounds the request head with `header_read_timeout`. HTTP/2 has
/// no per-request head timeout in hyper; a peer that stops answering
/// keep-alive pings within the read timeout is disconnected instead.
fn connection_builder(timeouts: &TimeoutConfig) -> Builder<TokioExecutor> {
    let mut builder = Builder::new(TokioExecutor::new());
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(timeouts.read);
    builder
        .http2()
        .timer(TokioTimer::new())
        .keep_alive_interval(timeouts.read)
        .keep_alive_timeout(timeouts.read);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_reports_ephemeral_port() {
        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        assert_ne!(listener.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn bind_fails_on_occupied_port() {
        let first = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = first.local_addr().to_string();
        assert!(Listener::bind(&addr).await.is_err());
    }

    #[tokio::test]
    async fn bind_fails_on_invalid_port() {
        assert!(Listener::bind("0.0.0.0:not-a-port").await.is_err());
        assert!(Listener::bind("0.0.0.0:70000").await.is_err());
    }
}
