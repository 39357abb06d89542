//! Configuration schema definitions.
//!
//! Everything here has a default, so a process started with an empty
//! environment still gets a complete `ServerConfig`.

use std::fmt;
use std::time::Duration;

/// Port used when `PORT` is unset or empty.
pub const DEFAULT_PORT: &str = "8001";

/// Upper bound on draining in-flight requests after a shutdown signal.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);

/// Root configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP port, kept as given. A value that is not a valid port surfaces
    /// as a bind failure at startup.
    pub port: String,

    /// Run mode. Only affects logging.
    pub mode: Mode,

    /// Per-connection timeouts.
    pub timeouts: TimeoutConfig,

    /// How long shutdown waits for in-flight requests.
    pub shutdown_deadline: Duration,
}

impl ServerConfig {
    /// Address the listener binds to (all interfaces).
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            mode: Mode::default(),
            timeouts: TimeoutConfig::default(),
            shutdown_deadline: SHUTDOWN_DEADLINE,
        }
    }
}

/// Run mode, read from `GIN_MODE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Debug,
    Release,
    Test,
    /// Unrecognized value. Accepted and treated like `Debug`.
    Other(String),
}

impl Mode {
    /// Parse a mode string. Never fails; unknown values are preserved.
    pub fn parse(value: &str) -> Self {
        match value {
            "debug" => Mode::Debug,
            "release" => Mode::Release,
            "test" => Mode::Test,
            other => Mode::Other(other.to_string()),
        }
    }

    /// The mode as it appears in `GIN_MODE`.
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Debug => "debug",
            Mode::Release => "release",
            Mode::Test => "test",
            Mode::Other(value) => value,
        }
    }

    /// Whether this is one of `debug`, `release` or `test`.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Mode::Other(_))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-connection timeout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Time allowed for a client to send the request head.
    pub read: Duration,

    /// Time allowed for a request to produce its response.
    pub write: Duration,

    /// A connection with no socket activity for this long is closed.
    pub idle: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(15),
            write: Duration::from_secs(15),
            idle: Duration::from_secs(60),
        }
    }
}
