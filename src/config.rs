//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `VITALWATCH_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ClientConfig;
use crate::timefmt::DisplayZone;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Monitoring backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    10_000 // 10 seconds
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// HTTP client settings for this backend
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.timeout_ms,
        }
    }
}

/// Preference store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesConfig {
    /// JSON file holding preferences; platform config dir when unset
    pub path: Option<String>,
}

impl PreferencesConfig {
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => PathBuf::from(path),
            None => crate::prefs::FilePreferenceStore::default_path(),
        }
    }
}

/// Timestamp display configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// Fixed UTC offset in minutes; the host's local offset when unset
    pub utc_offset_minutes: Option<i32>,
}

impl DisplayConfig {
    pub fn zone(&self) -> DisplayZone {
        match self.utc_offset_minutes {
            Some(minutes) => DisplayZone::from_minutes(minutes).unwrap_or_else(|| {
                tracing::warn!(minutes, "Invalid UTC offset, using local time");
                DisplayZone::local()
            }),
            None => DisplayZone::local(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("vitalwatch").join("config.toml")),
            Some(PathBuf::from("./vitalwatch.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any variable source
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = var("VITALWATCH_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = var("VITALWATCH_API_TIMEOUT") {
            if let Ok(ms) = timeout.trim().parse() {
                self.api.timeout_ms = ms;
            }
        }

        // Preference overrides
        if let Some(path) = var("VITALWATCH_PREFS_PATH") {
            self.preferences.path = Some(path);
        }

        // Display overrides
        if let Some(offset) = var("VITALWATCH_UTC_OFFSET_MINUTES") {
            if let Ok(minutes) = offset.trim().parse() {
                self.display.utc_offset_minutes = Some(minutes);
            }
        }

        // Logging overrides
        if let Some(level) = var("VITALWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("VITALWATCH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# VitalWatch Configuration
#
# Environment variables override these settings:
# - VITALWATCH_API_URL
# - VITALWATCH_API_TIMEOUT
# - VITALWATCH_PREFS_PATH
# - VITALWATCH_UTC_OFFSET_MINUTES
# - VITALWATCH_LOG_LEVEL
# - VITALWATCH_LOG_FORMAT

[api]
# Monitoring backend URL, including the API prefix
base_url = "http://localhost:8000/api"

# Request timeout in milliseconds
timeout_ms = 10000

[preferences]
# Preference file (page sizes, columns, density, theme)
# Defaults to <config dir>/vitalwatch/preferences.json
# path = "/home/me/.config/vitalwatch/preferences.json"

[display]
# Fixed UTC offset for timestamps, in minutes east of UTC
# Defaults to the host's local offset
# utc_offset_minutes = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
