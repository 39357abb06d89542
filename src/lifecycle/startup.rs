//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener on the configured port
//! - Wrap the application routes in the middleware stack
//! - Spawn the serving task and hand back an owning `ServerHandle`
//!
//! # Design Decisions
//! - Fail fast: a bind error is returned, never retried
//! - The caller owns the shutdown token; startup only subscribes to it

use std::io;
use std::net::SocketAddr;

use axum::Router;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::health::SERVICE_VERSION;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::state::{Phase, PhaseTracker};
use crate::net::connection::ConnectionTracker;
use crate::net::listener::Listener;

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// A running server.
///
/// Owns the serving task, which in turn owns the listening socket and
/// every connection task. Consumed by [`ServerHandle::shutdown`].
#[derive(Debug)]
pub struct ServerHandle {
    pub(crate) local_addr: SocketAddr,
    pub(crate) task: JoinHandle<()>,
    pub(crate) shutdown: Shutdown,
    pub(crate) phase: PhaseTracker,
    pub(crate) connections: ConnectionTracker,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    /// Watch lifecycle transitions, including those made after shutdown
    /// consumes the handle.
    pub fn subscribe_phase(&self) -> tokio::sync::watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Number of currently open client connections.
    pub fn open_connections(&self) -> u64 {
        self.connections.active_count()
    }
}

/// Bind and start serving `routes` behind the standard middleware stack.
pub async fn start(
    config: &ServerConfig,
    routes: Router,
    shutdown: &Shutdown,
) -> Result<ServerHandle, StartError> {
    let phase = PhaseTracker::new();
    phase.advance(Phase::Starting);

    let addr = config.bind_address();
    let listener = match Listener::bind(&addr).await {
        Ok(listener) => listener,
        Err(source) => {
            phase.advance(Phase::FailedStart);
            return Err(StartError::Bind { addr, source });
        }
    };
    let local_addr = listener.local_addr();

    let server = HttpServer::new(config.clone(), routes);
    let connections = ConnectionTracker::new();

    phase.advance(Phase::Serving);
    tracing::info!(
        address = %local_addr,
        mode = %config.mode,
        version = SERVICE_VERSION,
        "Auth service starting"
    );

    let task = tokio::spawn(server.run(
        listener,
        shutdown.subscribe(),
        phase.clone(),
        connections.clone(),
    ));

    Ok(ServerHandle {
        local_addr,
        task,
        shutdown: shutdown.clone(),
        phase,
        connections,
    })
}
