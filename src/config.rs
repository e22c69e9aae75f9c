//! Configuration management for cunli.
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! (`cunli.toml` in the working directory, or an explicit `--config` path),
//! then `CUNLI_*` environment variables. CLI flags are applied last by the
//! command layer.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::scrapers::hierarchy::DEFAULT_API_BASE;
use crate::scrapers::rate_limiter::{RateLimitConfig, DEFAULT_REQUEST_DELAY};
use crate::services::reconcile::DEFAULT_OVERRIDES_PATH;
use crate::storage::{HARVEST_FILENAME, MAPPED_FILENAME};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "cunli.toml";

/// Default reference TopoJSON location.
pub const DEFAULT_REFERENCE_PATH: &str = "taiwan_basecode/cunli/topo/20240807.json";

pub const ENV_API_BASE: &str = "CUNLI_API_BASE";
pub const ENV_REQUEST_DELAY_MS: &str = "CUNLI_REQUEST_DELAY_MS";
pub const ENV_REQUEST_TIMEOUT: &str = "CUNLI_REQUEST_TIMEOUT";
pub const ENV_REFERENCE: &str = "CUNLI_REFERENCE";
pub const ENV_OVERRIDES: &str = "CUNLI_OVERRIDES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory for raw API snapshots.
    pub raw_dir: PathBuf,
    /// Directory for the harvested and mapped tables.
    pub docs_dir: PathBuf,
    /// RangeInfo service root.
    pub api_base: String,
    /// User agent override (None = default browser agent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay between requests in milliseconds.
    pub request_delay_ms: u64,
    /// Reference TopoJSON dataset.
    pub reference: PathBuf,
    /// Manual override asset.
    pub overrides: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw"),
            docs_dir: PathBuf::from("docs"),
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: None,
            request_timeout: 30,
            request_delay_ms: DEFAULT_REQUEST_DELAY.as_millis() as u64,
            reference: PathBuf::from(DEFAULT_REFERENCE_PATH),
            overrides: PathBuf::from(DEFAULT_OVERRIDES_PATH),
        }
    }
}

impl Settings {
    /// Load settings from defaults, the config file and the environment.
    ///
    /// An explicit `config` path must exist; the default `cunli.toml` is
    /// optional.
    pub fn load(config: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match config {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILENAME);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env(|var| std::env::var(var).ok())?;
        Ok(settings)
    }

    /// Parse a TOML config file on top of the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(settings)
    }

    /// Apply `CUNLI_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(ENV_API_BASE) {
            self.api_base = base;
        }
        if let Some(value) = lookup(ENV_REQUEST_DELAY_MS) {
            self.request_delay_ms = parse_env(ENV_REQUEST_DELAY_MS, value)?;
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout = parse_env(ENV_REQUEST_TIMEOUT, value)?;
        }
        if let Some(path) = lookup(ENV_REFERENCE) {
            self.reference = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_OVERRIDES) {
            self.overrides = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig::with_delay(Duration::from_millis(self.request_delay_ms))
    }

    /// Path of the harvested table.
    pub fn harvest_path(&self) -> PathBuf {
        self.docs_dir.join(HARVEST_FILENAME)
    }

    /// Path of the mapped table.
    pub fn mapped_path(&self) -> PathBuf {
        self.docs_dir.join(MAPPED_FILENAME)
    }

    /// Ensure the output directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [&self.raw_dir, &self.docs_dir] {
            fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory '{}': {}", dir.display(), e),
                )
            })?;
        }
        Ok(())
    }
}

fn parse_env(var: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}
