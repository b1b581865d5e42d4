//! Configuration management for seiswave.
//!
//! Loads configuration from TOML files covering the worker pool, the
//! backend API, and display layout defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub worker: WorkerConfig,
    pub api: ApiConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default locations.
    ///
    /// Searches in order:
    /// 1. `./seiswave.toml`
    /// 2. `~/.config/seiswave/seiswave.toml`
    ///
    /// Returns default config if no file found.
    pub fn load_default() -> Self {
        if let Ok(config) = Self::load("seiswave.toml") {
            return config;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("seiswave").join("seiswave.toml");
            if let Ok(config) = Self::load(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Save configuration to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from("seiswave.toml")
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of worker tasks. `None` sizes the pool to available
    /// hardware concurrency, capped at 4.
    pub pool_size: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { pool_size: None }
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for filter-definition queries. Fetch operations fail
    /// fast when absent.
    pub base_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: None }
    }
}

/// Display layout defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Lower bound of the device (GL) unit range.
    pub gl_min: f64,
    /// Upper bound of the device (GL) unit range.
    pub gl_max: f64,
    /// Pixels reserved for channel labels on the left edge.
    pub label_width_px: f64,
    /// Frame tick period for debounced recomputation, in milliseconds.
    pub frame_duration_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            gl_min: 0.0,
            gl_max: 100.0,
            label_width_px: 184.0,
            frame_duration_ms: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.worker.pool_size.is_none());
        assert!(config.api.base_url.is_none());
        assert_eq!(config.display.gl_max, 100.0);
        assert_eq!(config.display.frame_duration_ms, 16);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[worker]
pool_size = 2

[api]
base_url = "https://example.invalid/api"

[display]
gl_min = -1.0
gl_max = 1.0
label_width_px = 120.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.worker.pool_size, Some(2));
        assert_eq!(config.api.base_url.as_deref(), Some("https://example.invalid/api"));
        assert_eq!(config.display.gl_min, -1.0);
        assert_eq!(config.display.gl_max, 1.0);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.display.frame_duration_ms, 16);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.display.label_width_px, 184.0);
    }
}
