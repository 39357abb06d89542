//! Auth service: HTTP server bootstrap with graceful lifecycle management.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::{LifecycleError, ServerHandle, Shutdown};
