//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! accepted connection (net)
//!     → server.rs (middleware stack around the routes)
//!     → request.rs (x-request-id set and echoed)
//!     → middleware/ (access log, panic recovery)
//!     → api.rs (application routes) / response.rs (JSON errors)
//! ```

pub mod api;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
