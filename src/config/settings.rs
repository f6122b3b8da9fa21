//! Configuration structures.
//!
//! [`FileConfig`] maps directly to the JSON configuration file format.
//! [`Config`] is the validated runtime configuration assembled from the
//! file, the environment and the command line.

use serde::Deserialize;
use serde_json::Value;

use super::credentials::ShowCredentials;
use crate::error::ConfigError;

/// Production endpoint of the Podhome integration API.
pub const DEFAULT_BASE_URL: &str = "https://serve.podhome.fm";

/// Root structure of the JSON configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Base URL of the Podhome API.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Show to API key mapping, as an object or a JSON string.
    #[serde(default)]
    pub shows: Option<Value>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Validated runtime configuration.
#[derive(Debug)]
pub struct Config {
    /// Base URL of the Podhome API, without a trailing slash.
    pub base_url: String,

    /// Per-show API keys.
    pub shows: ShowCredentials,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Config {
    /// Builds a configuration from a base URL and a show mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the show mapping is malformed or the result
    /// fails [`Config::validate`].
    pub fn new(base_url: Option<&str>, shows: &Value) -> Result<Self, ConfigError> {
        let config = Self {
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim()
                .trim_end_matches('/')
                .to_string(),
            shows: ShowCredentials::parse(shows)?,
            logging: LoggingConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shows.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "PODHOME_SHOWS must contain at least one show".to_string(),
            });
        }

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid base URL '{}'. Must start with http:// or https://",
                    self.base_url
                ),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
