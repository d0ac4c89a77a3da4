//! Configuration for the streaming controller.
//!
//! Values come from, in increasing priority:
//! 1. built-in defaults,
//! 2. an optional TOML file,
//! 3. environment variables:
//!    - `STREAM_TICK_MS`      (default: 1000)
//!    - `STREAM_RECONNECT_MS` (default: 5000)
//!    - `STREAM_SYMBOL`       (default: "BTCUSDT")
//!    - `STREAM_SEED`         (default: unset, entropy-seeded)
//! 4. command-line flags (applied by the binary).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Streaming controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Time between feed ticks.
    pub tick_ms: u64,

    /// Delay before a scheduled reconnect fires.
    pub reconnect_ms: u64,

    /// Symbol selected at startup.
    pub symbol: String,

    /// RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            tick_ms: 1000,
            reconnect_ms: 5000,
            symbol: "BTCUSDT".to_string(),
            seed: None,
        }
    }
}

impl StreamConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        StreamConfig::default().with_overrides(|key| env::var(key).ok())
    }

    /// Read a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        StreamConfig::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: StreamConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STREAM_*` overrides looked up through `lookup`.
    pub fn with_overrides<L>(mut self, lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(tick_ms) = parse_override(&lookup, "STREAM_TICK_MS")? {
            self.tick_ms = tick_ms;
        }
        if let Some(reconnect_ms) = parse_override(&lookup, "STREAM_RECONNECT_MS")? {
            self.reconnect_ms = reconnect_ms;
        }
        if let Some(seed) = parse_override(&lookup, "STREAM_SEED")? {
            self.seed = Some(seed);
        }
        if let Some(symbol) = lookup("STREAM_SYMBOL") {
            self.symbol = symbol;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroInterval("tick_ms"));
        }
        if self.reconnect_ms == 0 {
            return Err(ConfigError::ZeroInterval("reconnect_ms"));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_ms)
    }
}

fn parse_override<T, L>(lookup: &L, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        None => Ok(None),
    }
}
