//! Archived snapshot lookup.
//!
//! Queries the Wayback Machine availability API for the closest archived
//! capture of a URL. One GET per lookup, no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{PagegrabError, Result};

/// Wayback Machine availability endpoint.
pub const AVAILABILITY_ENDPOINT: &str = "https://archive.org/wayback/available";

/// HTTP client configuration for archive lookups.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: "Mozilla/5.0 (compatible; pagegrab/0.1)".to_string() }
    }
}

/// Result of an availability lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSnapshot {
    pub available: bool,
    pub snapshot_url: Option<String>,
}

impl ArchiveSnapshot {
    pub fn missing() -> Self {
        Self { available: false, snapshot_url: None }
    }

    pub fn found(snapshot_url: impl Into<String>) -> Self {
        Self { available: true, snapshot_url: Some(snapshot_url.into()) }
    }

    /// Snapshot URL when one is available.
    pub fn url(&self) -> Option<&str> {
        if self.available { self.snapshot_url.as_deref() } else { None }
    }
}

/// Source of archived snapshots.
#[async_trait]
pub trait ArchiveLookup: Send + Sync {
    /// Looks up the most recent snapshot of `url`.
    async fn lookup(&self, url: &str) -> Result<ArchiveSnapshot>;
}

/// [`ArchiveLookup`] backed by the Wayback Machine availability API.
#[derive(Debug, Clone)]
pub struct WaybackClient {
    client: Client,
    endpoint: Url,
    config: FetchConfig,
}

impl WaybackClient {
    /// Creates a client for the public endpoint.
    pub fn new(config: FetchConfig) -> Result<Self> {
        Self::with_endpoint(AVAILABILITY_ENDPOINT, config)
    }

    /// Creates a client for an alternative availability endpoint.
    pub fn with_endpoint(endpoint: &str, config: FetchConfig) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| PagegrabError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(PagegrabError::HttpError)?;

        Ok(Self { client, endpoint, config })
    }

    /// Full request URL for `target`, with the target query-encoded.
    pub fn request_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", target);
        url
    }
}

#[async_trait]
impl ArchiveLookup for WaybackClient {
    async fn lookup(&self, url: &str) -> Result<ArchiveSnapshot> {
        let request_url = self.request_url(url);
        debug!(%request_url, "querying archive availability");

        let response = self
            .client
            .get(request_url)
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PagegrabError::Lookup(format!("request timed out after {} seconds", self.config.timeout))
                } else {
                    PagegrabError::HttpError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PagegrabError::Lookup(format!("availability API returned {status}")));
        }

        let body = response.text().await?;
        parse_availability(&body)
    }
}

/// Parses an availability API response body.
///
/// A snapshot is reported only when `archived_snapshots.closest.url` is a
/// string and `closest.available` is not `false`; any other well-formed JSON
/// means no snapshot.
///
/// # Errors
///
/// Returns [`PagegrabError::ArchiveParse`] if the body is not valid JSON.
pub fn parse_availability(body: &str) -> Result<ArchiveSnapshot> {
    let value: Value = serde_json::from_str(body).map_err(|e| PagegrabError::ArchiveParse(e.to_string()))?;

    let Some(closest) = value.pointer("/archived_snapshots/closest") else {
        return Ok(ArchiveSnapshot::missing());
    };

    if closest.get("available").and_then(Value::as_bool) == Some(false) {
        return Ok(ArchiveSnapshot::missing());
    }

    match closest.get("url").and_then(Value::as_str) {
        Some(url) if !url.is_empty() => Ok(ArchiveSnapshot::found(url)),
        _ => Ok(ArchiveSnapshot::missing()),
    }
}
