//! HTTP client for the Podhome integration API.
//!
//! A [`PodhomeClient`] is built for one tool invocation and dropped at its
//! end. Dropping it (including when the invocation is cancelled) closes the
//! underlying connections.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Method, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::payload::{EpisodeQuery, Payload};
use crate::error::ToolError;

/// Header carrying the per-show API key (`X-API-KEY`).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Overall timeout for a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 10;

/// Client for one show's view of the Podhome API.
#[derive(Debug)]
pub struct PodhomeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PodhomeClient {
    /// Creates a client that authenticates every request with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ClientSetup`] if the key is not a valid header
    /// value, the base URL cannot be parsed, or the TLS backend fails to
    /// initialise.
    pub fn new(api_key: &SecretString, base_url: &str) -> Result<Self, ToolError> {
        let mut key = HeaderValue::from_str(api_key.expose_secret()).map_err(|_| {
            ToolError::ClientSetup(
                "API key contains characters that are not allowed in an HTTP header".to_string(),
            )
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ToolError::ClientSetup(e.to_string()))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| ToolError::ClientSetup(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self { http, base_url })
    }

    // ========== Episodes ==========

    /// Creates a new episode.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn create_episode(&self, payload: &Payload) -> Result<Value, ToolError> {
        self.send(Method::POST, &["api", "createepisode"], &[], Some(payload))
            .await
    }

    /// Lists episodes, applying only the supplied filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn list_episodes(&self, query: &EpisodeQuery) -> Result<Value, ToolError> {
        self.send(Method::GET, &["api", "episodes"], &query.to_pairs(), None)
            .await
    }

    /// Fetches a single episode.
    ///
    /// `query.status` is ignored; the API has no status filter for lookups.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn get_episode(
        &self,
        episode_id: &str,
        query: &EpisodeQuery,
    ) -> Result<Value, ToolError> {
        let query = EpisodeQuery {
            status: None,
            ..*query
        };
        self.send(
            Method::GET,
            &["api", "episode", episode_id],
            &query.to_pairs(),
            None,
        )
        .await
    }

    /// Schedules or immediately publishes an episode.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn schedule_episode(&self, payload: &Payload) -> Result<Value, ToolError> {
        self.send(Method::POST, &["api", "schedule_episode"], &[], Some(payload))
            .await
    }

    /// Modifies an episode's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn modify_episode(&self, payload: &Payload) -> Result<Value, ToolError> {
        self.send(Method::POST, &["api", "modify_episode"], &[], Some(payload))
            .await
    }

    /// Deletes an episode.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn delete_episode(&self, episode_id: &str) -> Result<Value, ToolError> {
        self.send(
            Method::DELETE,
            &["api", "deleteepisode", episode_id],
            &[],
            None,
        )
        .await
    }

    // ========== Clips ==========

    /// Creates a clip (soundbite) from an episode.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn create_clip(&self, payload: &Payload) -> Result<Value, ToolError> {
        self.send(Method::POST, &["api", "createclip"], &[], Some(payload))
            .await
    }

    // ========== Webhooks ==========

    /// Lists registered webhooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn list_webhooks(&self) -> Result<Value, ToolError> {
        self.send(Method::GET, &["api", "hook"], &[], None).await
    }

    /// Registers a webhook.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn register_webhook(&self, payload: &Payload) -> Result<Value, ToolError> {
        self.send(Method::POST, &["api", "hook"], &[], Some(payload))
            .await
    }

    /// Deletes a webhook. The payload carries the integration ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn delete_webhook(&self, payload: &Payload) -> Result<Value, ToolError> {
        self.send(Method::DELETE, &["api", "hook"], &[], Some(payload))
            .await
    }

    /// Triggers webhooks with the latest published or live episode.
    ///
    /// An empty payload tests every registered webhook.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn test_webhook(&self, payload: &Payload) -> Result<Value, ToolError> {
        self.send(Method::POST, &["api", "hooktest"], &[], Some(payload))
            .await
    }

    /// Builds the absolute URL for an endpoint below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ToolError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ToolError::ClientSetup(format!("base URL '{}' cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one request and decodes the JSON response.
    ///
    /// Non-2xx responses become [`ToolError::HttpStatus`]. An empty 2xx
    /// body decodes to `null`.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&'static str, String)],
        body: Option<&Payload>,
    ) -> Result<Value, ToolError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();

        tracing::debug!(%method, path = %path, query = ?query, "Sending Podhome API request");

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ToolError::Transport {
            path: path.clone(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ToolError::Transport {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path, status = %status, bytes = text.len(), "Podhome API response");

        if !status.is_success() {
            return Err(ToolError::HttpStatus {
                path,
                status,
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|source| ToolError::Decoding { path, source })
    }
}
