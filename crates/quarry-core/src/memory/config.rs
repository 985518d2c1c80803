use serde::Deserialize;
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid memory backend config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("watch_capacity must be at least 1")]
    ZeroCapacity,
}

///
/// MemoryConfig
///
/// Settings of the in-memory backend. Every key is optional:
///
/// ```toml
/// watch_capacity = 1024
/// default_timeout_ms = 250
/// debug = false
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Buffered change events per watch subscriber before it lags.
    #[serde(default = "default_watch_capacity")]
    pub watch_capacity: usize,

    /// Deadline for queries that carry no timeout of their own.
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,

    /// Log query plans at `debug` instead of `trace`.
    #[serde(default)]
    pub debug: bool,
}

const fn default_watch_capacity() -> usize {
    1024
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            watch_capacity: default_watch_capacity(),
            default_timeout_ms: None,
            debug: false,
        }
    }
}

impl MemoryConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        if config.watch_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(config)
    }

    #[must_use]
    pub const fn default_timeout(&self) -> Option<Duration> {
        match self.default_timeout_ms {
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        }
    }
}
