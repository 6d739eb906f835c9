//! Error types for pagegrab operations.
//!
//! This module defines the main error type [`PagegrabError`] which covers
//! every failure the retrieval pipeline can observe: browser navigation,
//! archive lookups, screenshot capture, configuration and file output.
//!
//! Most variants are recoverable inside the orchestrator, which simply
//! advances to the next strategy. Only [`PagegrabError::Exhausted`] and the
//! configuration/output variants ever reach a caller of
//! [`Retriever::retrieve`](crate::Retriever::retrieve).
//!
//! # Example
//!
//! ```rust
//! use pagegrab_core::{PagegrabError, Result};
//!
//! fn require_url(url: &str) -> Result<&str> {
//!     if url.is_empty() {
//!         return Err(PagegrabError::InvalidUrl("empty URL".to_string()));
//!     }
//!     Ok(url)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for retrieval operations.
#[derive(Error, Debug)]
pub enum PagegrabError {
    /// Navigation could not complete.
    ///
    /// Covers unreachable hosts, DNS failures and pages the browser refused
    /// to load.
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Navigation did not settle before its deadline.
    ///
    /// Classified as a navigation failure, see [`PagegrabError::is_navigation`].
    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// The browser could not be launched or stopped responding.
    #[error("Browser error: {0}")]
    Browser(String),

    /// The session has no document to serialize or capture.
    #[error("No document loaded in the browser session")]
    NoDocument,

    /// HTTP request errors from reqwest.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The archive availability API answered with something other than success.
    #[error("Archive lookup failed: {0}")]
    Lookup(String),

    /// The archive availability API returned a body that is not valid JSON.
    #[error("Failed to parse archive response: {0}")]
    ArchiveParse(String),

    /// Screenshot capture failed.
    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Malformed configuration file content.
    #[error("Configuration error in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// File write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Every retrieval strategy failed.
    ///
    /// Carries the last underlying cause, which is always the failure of the
    /// final strategy in the chain.
    #[error("All retrieval strategies failed; last cause: {cause}")]
    Exhausted {
        #[source]
        cause: Box<PagegrabError>,
    },
}

impl PagegrabError {
    /// Returns true for failures of a navigation step (timeouts included).
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            PagegrabError::Navigation { .. }
                | PagegrabError::Timeout { .. }
                | PagegrabError::Browser(_)
                | PagegrabError::NoDocument
        )
    }

    /// Wraps `self` as the terminal cause of an exhausted run.
    pub fn exhausted(self) -> Self {
        PagegrabError::Exhausted { cause: Box::new(self) }
    }
}

/// Result type alias for PagegrabError.
pub type Result<T> = std::result::Result<T, PagegrabError>;
