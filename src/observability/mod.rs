//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! lifecycle, net, http
//!     → tracing events and spans (request id, method, path, status)
//!     → logging.rs (EnvFilter + fmt/json layer on stdout)
//! ```

pub mod logging;
