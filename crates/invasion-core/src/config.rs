//! Configuration loading for the simulation.
//!
//! Settings come from built-in defaults, optionally overridden by a TOML file
//! and then by command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default map file
pub const DEFAULT_MAP_FILE: &str = "./maps/big.map";

/// Default HTTP listen address
pub const DEFAULT_HTTP_ADDRESS: &str = ":8080";

/// Address value that turns the map service off
pub const HTTP_DISABLED: &str = "-1";

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Map file to load
    pub map_file: PathBuf,
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
    /// Ticks to run before stopping
    pub max_moves: u64,
    /// Aliens landed at start
    pub num_aliens: usize,
    /// Directory the final map is written to
    pub output_dir: PathBuf,
    /// Optional JSONL event log
    pub events_file: Option<PathBuf>,
    /// Fixed random seed; absent seeds from entropy
    pub seed: Option<u64>,
    /// Map service address; absent or "-1" disables it
    pub http_address: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_file: PathBuf::from(DEFAULT_MAP_FILE),
            tick_interval_ms: 1000,
            max_moves: 10_000,
            num_aliens: 0,
            output_dir: PathBuf::from("."),
            events_file: None,
            seed: None,
            http_address: Some(DEFAULT_HTTP_ADDRESS.to_string()),
        }
    }
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms < 1 {
            return Err(ConfigError::Invalid("tick interval must be at least 1 ms".into()));
        }
        if self.max_moves < 1 {
            return Err(ConfigError::Invalid("max moves must be at least 1".into()));
        }
        if self.num_aliens < 1 {
            return Err(ConfigError::Invalid("number of aliens must be at least 1".into()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The map service address, or `None` when serving is disabled.
    pub fn http_address(&self) -> Option<&str> {
        self.http_address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty() && *address != HTTP_DISABLED)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
