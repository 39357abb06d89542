//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Pick verbosity and format from the run mode
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the mode's default filter
//! - JSON output in release mode, human-readable otherwise
//! - Unknown modes log like debug
//! - Every mode keeps `info` for this crate: start, access and shutdown
//!   lines are always emitted, only debug detail varies

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Mode;

/// Default filter for a mode when `RUST_LOG` is not set.
pub fn default_filter(mode: &Mode) -> &'static str {
    match mode {
        Mode::Release => "auth_service=info,tower_http=info",
        Mode::Test => "auth_service=info,tower_http=warn",
        Mode::Debug | Mode::Other(_) => "auth_service=debug,tower_http=debug",
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(mode: &Mode) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(mode)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match mode {
        Mode::Release => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if installed.is_err() {
        return;
    }

    if !mode.is_recognized() {
        tracing::warn!(mode = %mode, "Unrecognized GIN_MODE, continuing with debug logging");
    }
}
