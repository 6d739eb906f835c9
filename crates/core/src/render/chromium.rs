//! Chromium-based renderer using chromiumoxide.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{RenderSession, Renderer, WaitPolicy};
use crate::{PagegrabError, Result};

/// Environment variable overriding the Chromium executable.
pub const CHROMIUM_PATH_ENV: &str = "PAGEGRAB_CHROMIUM_PATH";

const READY_STATE_PROBE: &str = "[document.readyState, performance.getEntriesByType('resource').length]";

/// Launch options for [`ChromiumRenderer`].
#[derive(Debug, Clone)]
pub struct ChromiumConfig {
    /// Browser executable; looked up with [`find_chromium`] when unset.
    pub executable: Option<PathBuf>,
    /// How long the resource count must stay unchanged to count as quiescent.
    pub quiet_window: Duration,
    /// Interval between ready-state probes.
    pub poll_interval: Duration,
    /// Extra command-line switches passed to Chromium.
    pub args: Vec<String>,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            executable: None,
            quiet_window: Duration::from_millis(500),
            poll_interval: Duration::from_millis(100),
            args: vec!["--disable-setuid-sandbox".to_string(), "--disable-gpu".to_string()],
        }
    }
}

/// Find the Chromium binary path.
///
/// Checks [`CHROMIUM_PATH_ENV`] first, then the usual executable names on
/// `PATH`.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }

    ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// [`Renderer`] that launches one headless Chromium per session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumRenderer {
    config: ChromiumConfig,
}

impl ChromiumRenderer {
    pub fn new(config: ChromiumConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open(&self) -> Result<Box<dyn RenderSession>> {
        let executable = self
            .config
            .executable
            .clone()
            .or_else(find_chromium)
            .ok_or_else(|| PagegrabError::Browser(format!("Chromium not found; set {CHROMIUM_PATH_ENV}")))?;

        debug!(executable = %executable.display(), "launching Chromium");

        let browser_config = BrowserConfig::builder()
            .chrome_executable(executable)
            .no_sandbox()
            .args(self.config.args.iter())
            .build()
            .map_err(|e| PagegrabError::Browser(format!("failed to build browser config: {e}")))?;

        let (mut browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| PagegrabError::Browser(format!("failed to launch Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                return Err(PagegrabError::Browser(format!("failed to create page: {e}")));
            }
        };

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler,
            navigated: false,
            quiet_window: self.config.quiet_window,
            poll_interval: self.config.poll_interval,
        }))
    }
}

/// A Chromium process with a single page.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    navigated: bool,
    quiet_window: Duration,
    poll_interval: Duration,
}

impl ChromiumSession {
    async fn probe(&self) -> Option<(String, u64)> {
        self.page.evaluate(READY_STATE_PROBE).await.ok()?.into_value().ok()
    }

    async fn wait_for_dom(&self) {
        loop {
            if let Some((state, _)) = self.probe().await
                && state != "loading"
            {
                return;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn wait_for_quiescence(&self) {
        let mut last_count = None;
        let mut stable_for = Duration::ZERO;

        loop {
            match self.probe().await {
                Some((state, count)) if state == "complete" => {
                    if last_count == Some(count) {
                        stable_for += self.poll_interval;
                        if stable_for >= self.quiet_window {
                            return;
                        }
                    } else {
                        last_count = Some(count);
                        stable_for = Duration::ZERO;
                    }
                }
                _ => {
                    last_count = None;
                    stable_for = Duration::ZERO;
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn navigate_inner(&self, url: &str, wait: WaitPolicy) -> Result<()> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| PagegrabError::Navigation { url: url.to_string(), reason: e.to_string() })?;

        if let Some(reason) = response.result.error_text.clone() {
            return Err(PagegrabError::Navigation { url: url.to_string(), reason });
        }

        match wait {
            WaitPolicy::DomParsed => self.wait_for_dom().await,
            WaitPolicy::NetworkQuiescent => {
                let _ = self.page.wait_for_navigation().await;
                self.wait_for_quiescence().await;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, wait: WaitPolicy, timeout: Duration) -> Result<()> {
        self.navigated = false;
        debug!(url, %wait, timeout_ms = timeout.as_millis() as u64, "navigating");

        let result = tokio::time::timeout(timeout, self.navigate_inner(url, wait)).await;

        match result {
            Ok(Ok(())) => {
                self.navigated = true;
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PagegrabError::Timeout { url: url.to_string(), timeout_ms: timeout.as_millis() as u64 }),
        }
    }

    async fn rendered_html(&self) -> Result<String> {
        if !self.navigated {
            return Err(PagegrabError::NoDocument);
        }

        self.page
            .content()
            .await
            .map_err(|e| PagegrabError::Browser(format!("failed to get HTML: {e}")))
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        self.page
            .save_screenshot(params, path)
            .await
            .map(|_| ())
            .map_err(|e| PagegrabError::Capture(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumSession { mut browser, page, handler, .. } = *self;

        if let Err(e) = page.close().await {
            debug!(error = %e, "page close failed");
        }

        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "failed to reap Chromium process");
        }
        handler.abort();

        closed
            .map(|_| ())
            .map_err(|e| PagegrabError::Browser(format!("failed to close Chromium: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChromiumConfig::default();
        assert_eq!(config.quiet_window, Duration::from_millis(500));
        assert!(config.args.iter().any(|a| a == "--disable-setuid-sandbox"));
    }

    #[tokio::test]
    async fn test_missing_executable_is_browser_error() {
        let config = ChromiumConfig { executable: Some(PathBuf::from("/nonexistent/chromium")), ..Default::default() };
        let result = ChromiumRenderer::new(config).open().await;
        assert!(matches!(result, Err(ref e) if e.is_navigation()));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_navigate_and_capture() {
        let dir = tempfile::tempdir().unwrap();
        let shot = dir.path().join("page.png");

        let mut session = ChromiumRenderer::default().open().await.expect("failed to open session");
        session
            .navigate("data:text/html,<h1>Hello</h1><p>World</p>", WaitPolicy::NetworkQuiescent, Duration::from_secs(10))
            .await
            .expect("navigation failed");

        let html = session.rendered_html().await.expect("rendered_html failed");
        assert!(html.contains("<h1>Hello</h1>"));

        session.screenshot(&shot).await.expect("screenshot failed");
        assert!(shot.exists());

        session.close().await.expect("close failed");
    }
}
