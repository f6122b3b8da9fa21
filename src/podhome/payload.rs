//! Request bodies and query filters.
//!
//! The Podhome API distinguishes "unset" from "explicitly empty", so optional
//! fields are only written when the caller supplied them.

use serde::Serialize;
use serde_json::{Map, Value};

/// A JSON request body containing only the fields the caller supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field that is always present.
    #[must_use]
    pub fn required(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Adds a field only if `value` is `Some`.
    ///
    /// `Some(false)`, `Some(0)` and `Some("")` are kept.
    #[must_use]
    pub fn optional<T: Into<Value>>(mut self, name: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.fields.insert(name.to_string(), value.into());
        }
        self
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Iterates over the field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields were set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Payload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Optional filters for episode listing and lookup.
///
/// Only filters that are `Some` reach the query string; omission lets the
/// server apply its own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeQuery {
    /// Status filter: 0=Draft, 1=Scheduled, 2=Published, 3=LivePending,
    /// 4=Live, 5=LiveEnded.
    pub status: Option<i64>,
    /// Include the transcript.
    pub include_transcript: Option<bool>,
    /// Include chapters.
    pub include_chapters: Option<bool>,
    /// Include download counts.
    pub include_downloads: Option<bool>,
    /// Include people.
    pub include_people: Option<bool>,
}

impl EpisodeQuery {
    /// Renders the supplied filters as query pairs, using the API's
    /// camelCase parameter names.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let flags = [
            ("includeTranscript", self.include_transcript),
            ("includeChapters", self.include_chapters),
            ("includeDownloads", self.include_downloads),
            ("includePeople", self.include_people),
        ];

        self.status
            .map(|status| ("status", status.to_string()))
            .into_iter()
            .chain(
                flags
                    .into_iter()
                    .filter_map(|(name, flag)| flag.map(|flag| (name, flag.to_string()))),
            )
            .collect()
    }
}
