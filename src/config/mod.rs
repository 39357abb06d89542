//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (PORT, GIN_MODE)
//!     → loader.rs (lookup, empty-as-unset, defaults)
//!     → ServerConfig (immutable)
//!     → passed by value/reference to lifecycle and observability
//! ```
//!
//! # Design Decisions
//! - Resolution never fails; every field has a default
//! - No global mode flag: the mode travels inside `ServerConfig`
//! - Unknown mode strings are accepted as-is

pub mod loader;
pub mod schema;

pub use schema::{Mode, ServerConfig, TimeoutConfig};
