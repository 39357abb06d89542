//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, owns connection tasks)
//!     → connection.rs (activity tracking, HTTP/1+2 serving, drain)
//!     → Hand off to the axum router
//!
//! Connection States:
//!     Active → Draining (shutdown or idle) → Closed
//! ```
//!
//! # Design Decisions
//! - Hand-written accept loop so per-connection timeouts can be applied
//! - Each connection is tracked so shutdown can report abandoned ones
//! - Read timeout is hyper's header read timeout; idle timeout is ours

pub mod connection;
pub mod listener;
