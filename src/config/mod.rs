//! Configuration loading and parsing.
//!
//! The runtime configuration is assembled once at startup from three
//! sources, highest precedence first:
//!
//! 1. `--base-url` / `--shows` CLI flags, or the `PODHOME_BASE_URL` /
//!    `PODHOME_SHOWS` environment variables
//! 2. The JSON configuration file
//! 3. Built-in defaults (`https://serve.podhome.fm`)
//!
//! # Configuration File Locations
//!
//! 1. Path given as the `CONFIG_FILE` argument (must exist)
//! 2. Default location, used only if present:
//!    - **Linux/macOS:** `~/.podhome-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.podhome-mcp\config.json`

pub mod credentials;
mod settings;

pub use credentials::ShowCredentials;
pub use settings::{Config, FileConfig, LoggingConfig, DEFAULT_BASE_URL};

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ConfigError;

/// Values supplied outside the configuration file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Explicit path to a configuration file.
    pub config_path: Option<PathBuf>,
    /// Base URL from `PODHOME_BASE_URL` or `--base-url`.
    pub base_url: Option<String>,
    /// Raw show mapping from `PODHOME_SHOWS` or `--shows`.
    pub shows: Option<String>,
}

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.podhome-mcp/`
/// - **Windows:** `%USERPROFILE%\.podhome-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".podhome-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Reads and parses a configuration file.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be read, or is not
/// a valid configuration document.
pub fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Loads and validates the runtime configuration.
///
/// An explicit `config_path` must exist. Without one, the default location
/// is read only if a file is present there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit configuration file cannot be found or read
/// - The file's JSON is malformed or has unknown fields
/// - No source supplies the show mapping, or it is malformed
/// - Validation of the merged configuration fails
pub fn load_config(overrides: &Overrides) -> Result<Config, ConfigError> {
    let file = match &overrides.config_path {
        Some(path) => read_config_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            _ => FileConfig::default(),
        },
    };

    let shows = match &overrides.shows {
        Some(raw) => Value::String(raw.clone()),
        None => file.shows.ok_or(ConfigError::MissingShows)?,
    };
    let base_url = overrides.base_url.as_deref().or(file.base_url.as_deref());

    let mut config = Config::new(base_url, &shows)?;
    config.logging = file.logging;
    config.validate()?;

    Ok(config)
}
