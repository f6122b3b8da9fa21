//! Error types for podhome-mcp.
//!
//! # Security Note
//!
//! Error messages are carefully crafted to NEVER include API keys.
//! Variants that describe credentials carry show identifiers only, and
//! HTTP errors carry the request path, never the header set.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur during configuration operations.
///
/// These are fatal: the server does not start.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// No show credentials were supplied by any source.
    #[error("no shows configured: set PODHOME_SHOWS or \"shows\" in the configuration file")]
    MissingShows,

    /// The show credential mapping has the wrong shape.
    #[error("PODHOME_SHOWS must be a JSON object mapping show to API key: {message}")]
    InvalidShows {
        /// Description of the problem (never contains a key).
        message: String,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while executing a single tool call.
///
/// All of these are recovered at the tool boundary and rendered as
/// `Error: <message>` text.
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool arguments did not match the tool's input shape.
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[source] serde_json::Error),

    /// The HTTP client for the request could not be set up.
    #[error("failed to set up HTTP client: {0}")]
    ClientSetup(String),

    /// The requested show is not configured.
    #[error("Unknown show '{show}'. Configured shows: {known:?}")]
    UnknownShow {
        /// The show identifier the caller asked for.
        show: String,
        /// Identifiers of every configured show.
        known: Vec<String>,
    },

    /// The Podhome API answered with a non-2xx status.
    #[error("HTTP {status} from {path}: {body}")]
    HttpStatus {
        /// Request path.
        path: String,
        /// Response status.
        status: StatusCode,
        /// Response body, as text.
        body: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("request to {path} failed: {source}")]
    Transport {
        /// Request path.
        path: String,
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not valid JSON.
    #[error("invalid JSON in response from {path}: {source}")]
    Decoding {
        /// Request path.
        path: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
