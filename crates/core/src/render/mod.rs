//! Browser rendering abstraction.
//!
//! A [`Renderer`] opens [`RenderSession`]s; a session navigates, serializes
//! the rendered document and captures screenshots. The orchestrator only
//! talks to these traits, so the escalation logic runs unchanged against the
//! Chromium implementation or a test double.

#[cfg(feature = "chromium")]
pub mod chromium;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// When a navigation counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// The document has loaded and no network activity was observed for a
    /// short stability window.
    NetworkQuiescent,
    /// The document has been parsed; subresources may still be loading.
    DomParsed,
}

impl fmt::Display for WaitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitPolicy::NetworkQuiescent => f.write_str("network-quiescent"),
            WaitPolicy::DomParsed => f.write_str("dom-parsed"),
        }
    }
}

/// A browser engine that can open sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Launches the browser (if needed) and opens a fresh session.
    async fn open(&self) -> Result<Box<dyn RenderSession>>;
}

/// A single browser page.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Navigates to `url`, returning once `wait` is satisfied.
    ///
    /// Fails with a navigation error when the target is unreachable and with
    /// [`PagegrabError::Timeout`](crate::PagegrabError::Timeout) when `timeout`
    /// elapses first.
    async fn navigate(&mut self, url: &str, wait: WaitPolicy, timeout: Duration) -> Result<()>;

    /// Serialized markup of the current document.
    ///
    /// Only valid after a successful [`navigate`](RenderSession::navigate).
    async fn rendered_html(&self) -> Result<String>;

    /// Captures a full-page PNG of the current document to `path`.
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Releases the page and the browser behind it.
    async fn close(self: Box<Self>) -> Result<()>;
}
