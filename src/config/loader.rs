//! Configuration loading from the process environment.

use crate::config::schema::{Mode, ServerConfig};

/// Environment variable holding the listen port.
pub const PORT_VAR: &str = "PORT";

/// Environment variable holding the run mode.
pub const MODE_VAR: &str = "GIN_MODE";

impl ServerConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary lookup.
    ///
    /// Missing and empty values fall back to defaults, so this cannot fail.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let mut config = ServerConfig::default();
        if let Some(port) = read(PORT_VAR) {
            config.port = port;
        }
        if let Some(mode) = read(MODE_VAR) {
            config.mode = Mode::parse(&mode);
        }
        config
    }
}
