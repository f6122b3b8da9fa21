//! Per-show API key storage.
//!
//! Keys are parsed once at startup and wrapped in [`SecretString`] so they
//! never leak through `Debug` output or log fields. The only place a key is
//! revealed is when the HTTP client attaches the `X-API-KEY` header.

use indexmap::IndexMap;
use secrecy::SecretString;
use serde_json::Value;

use crate::error::{ConfigError, ToolError};

/// Mapping of show identifier to API key, in configured order.
#[derive(Debug, Default)]
pub struct ShowCredentials {
    shows: IndexMap<String, SecretString>,
}

impl ShowCredentials {
    /// Parses a show mapping from either a JSON object or a string holding
    /// a JSON object.
    ///
    /// Keys are trimmed. String values are used verbatim; numbers and
    /// booleans are coerced to their JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShows`] if the value is neither an
    /// object nor a JSON-encoded object, if a value is `null`, an array or
    /// an object, or if a key is empty or duplicated after trimming.
    pub fn parse(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => Self::from_object(map),
            Value::String(text) => {
                let decoded: Value =
                    serde_json::from_str(text).map_err(|e| ConfigError::InvalidShows {
                        message: format!("not valid JSON ({e})"),
                    })?;
                match decoded {
                    Value::Object(map) => Self::from_object(&map),
                    other => Err(ConfigError::InvalidShows {
                        message: format!("expected an object, got {}", json_kind(&other)),
                    }),
                }
            }
            other => Err(ConfigError::InvalidShows {
                message: format!(
                    "expected an object or JSON string, got {}",
                    json_kind(other)
                ),
            }),
        }
    }

    fn from_object(map: &serde_json::Map<String, Value>) -> Result<Self, ConfigError> {
        let mut shows = IndexMap::with_capacity(map.len());

        for (raw_key, raw_value) in map {
            let key = raw_key.trim();
            if key.is_empty() {
                return Err(ConfigError::InvalidShows {
                    message: "show identifiers must not be empty".to_string(),
                });
            }

            let secret = match raw_value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ConfigError::InvalidShows {
                        message: format!(
                            "API key for show '{key}' must be a string, got {}",
                            json_kind(other)
                        ),
                    });
                }
            };

            if shows
                .insert(key.to_string(), SecretString::new(secret))
                .is_some()
            {
                return Err(ConfigError::InvalidShows {
                    message: format!("show '{key}' is configured more than once"),
                });
            }
        }

        Ok(Self { shows })
    }

    /// Returns the API key for `show`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownShow`] listing the configured show
    /// identifiers if `show` is not one of them.
    pub fn resolve(&self, show: &str) -> Result<&SecretString, ToolError> {
        self.shows.get(show).ok_or_else(|| ToolError::UnknownShow {
            show: show.to_string(),
            known: self.names().map(str::to_string).collect(),
        })
    }

    /// Iterates over the configured show identifiers.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shows.keys().map(String::as_str)
    }

    /// Number of configured shows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shows.len()
    }

    /// Returns `true` if no shows are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
