//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap application routes in the middleware stack
//! - Hand the finished router to the accept loop
//!
//! # Middleware order (outermost first)
//! ```text
//! set x-request-id → access log → propagate x-request-id
//!     → panic recovery → write timeout → routes / JSON 404 fallback
//! ```

use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::middleware::{recovery_layer, AccessLog};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::not_found;
use crate::lifecycle::{PhaseTracker, ShutdownSignal};
use crate::net::connection::ConnectionTracker;
use crate::net::listener::Listener;

/// HTTP server for the auth service.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Wrap `routes` in the middleware stack for `config`.
    pub fn new(config: ServerConfig, routes: Router) -> Self {
        let router = Self::build_router(&config, routes);
        Self { router, config }
    }

    /// Build the router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, routes: Router) -> Router {
        routes.fallback(not_found).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(AccessLog)
                        .on_response(AccessLog),
                )
                .layer(propagate_request_id_layer())
                .layer(recovery_layer())
                .layer(TimeoutLayer::new(config.timeouts.write)),
        )
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires and connections drain.
    pub async fn run(
        self,
        listener: Listener,
        shutdown: ShutdownSignal,
        phase: PhaseTracker,
        connections: ConnectionTracker,
    ) {
        tracing::debug!(
            address = %listener.local_addr(),
            read_timeout_ms = self.config.timeouts.read.as_millis() as u64,
            write_timeout_ms = self.config.timeouts.write.as_millis() as u64,
            idle_timeout_ms = self.config.timeouts.idle.as_millis() as u64,
            "HTTP server running"
        );

        listener
            .serve(
                self.router,
                self.config.timeouts,
                shutdown,
                phase,
                connections,
            )
            .await;

        tracing::info!("HTTP server stopped");
    }
}
