//! Retrieval orchestration.
//!
//! The [`Retriever`] escalates through three strategies, strictly in order:
//!
//! 1. **Direct**: render the live page until the network is quiescent.
//! 2. **Archived**: look up a Wayback snapshot and render that instead.
//! 3. **Screenshot**: load whatever the live page gives within a short
//!    deadline, capture it as an image and write a placeholder document.
//!
//! Each stage is one transition function returning either a finished
//! [`RetrievalOutcome`] or a [`Cause`] to advance with. Only a failure of the
//! last stage is surfaced, as [`PagegrabError::Exhausted`].
//!
//! # Example
//!
//! ```rust,no_run
//! use pagegrab_core::{ChromiumRenderer, FetchConfig, RetrievalRequest, Retriever, WaybackClient};
//!
//! # async fn example() -> pagegrab_core::Result<()> {
//! let retriever = Retriever::new(ChromiumRenderer::default(), WaybackClient::new(FetchConfig::default())?);
//! let request = RetrievalRequest::new("https://example.com/article", "scrape.html")?;
//! let outcome = retriever.retrieve(&request).await?;
//! println!("{} via {}", outcome.source_url, outcome.method);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::fs;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::archive::ArchiveLookup;
use crate::outcome::{RetrievalMethod, RetrievalOutcome, RetrievalRequest};
use crate::render::{RenderSession, Renderer, WaitPolicy};
use crate::{PagegrabError, Result};

/// Per-stage deadlines for a [`Retriever`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Deadline for rendering the live page (default: 30s).
    pub direct_timeout: Duration,
    /// Deadline for rendering the archived snapshot (default: 30s).
    pub archived_timeout: Duration,
    /// Deadline for loading the page before the screenshot (default: 15s).
    pub screenshot_timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            direct_timeout: Duration::from_secs(30),
            archived_timeout: Duration::from_secs(30),
            screenshot_timeout: Duration::from_secs(15),
        }
    }
}

impl RetrievalConfig {
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::new()
    }
}

/// Builder for RetrievalConfig.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pagegrab_core::RetrievalConfig;
///
/// let config = RetrievalConfig::builder()
///     .direct_timeout(Duration::from_secs(10))
///     .build();
/// assert_eq!(config.screenshot_timeout, Duration::from_secs(15));
/// ```
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetrievalConfig::default() }
    }

    pub fn direct_timeout(mut self, value: Duration) -> Self {
        self.config.direct_timeout = value;
        self
    }

    pub fn archived_timeout(mut self, value: Duration) -> Self {
        self.config.archived_timeout = value;
        self
    }

    pub fn screenshot_timeout(mut self, value: Duration) -> Self {
        self.config.screenshot_timeout = value;
        self
    }

    pub fn build(self) -> RetrievalConfig {
        self.config
    }
}

impl Default for RetrievalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A stage of the escalation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Direct,
    Archived,
    Screenshot,
}

impl Stage {
    /// Stage to escalate to after this one fails, if any.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Direct => Some(Stage::Archived),
            Stage::Archived => Some(Stage::Screenshot),
            Stage::Screenshot => None,
        }
    }

    pub fn method(self) -> RetrievalMethod {
        match self {
            Stage::Direct => RetrievalMethod::Direct,
            Stage::Archived => RetrievalMethod::Archived,
            Stage::Screenshot => RetrievalMethod::Screenshot,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.method(), f)
    }
}

/// Why a stage handed over to the next one.
///
/// A lookup miss and a failed render of an existing snapshot are kept apart
/// even though both lead to the screenshot stage.
#[derive(Debug)]
pub enum Cause {
    /// The live page could not be rendered.
    Direct(PagegrabError),
    /// The archive lookup itself failed.
    ArchiveLookup(PagegrabError),
    /// The archive has no snapshot of the target.
    ArchiveMiss,
    /// A snapshot exists but could not be rendered.
    ArchivedNavigation { snapshot_url: String, error: PagegrabError },
    /// The screenshot could not be captured.
    Capture(PagegrabError),
}

impl Cause {
    /// The underlying error, synthesizing one for a lookup miss.
    pub fn into_error(self) -> PagegrabError {
        match self {
            Cause::Direct(e) | Cause::ArchiveLookup(e) | Cause::Capture(e) => e,
            Cause::ArchivedNavigation { error, .. } => error,
            Cause::ArchiveMiss => PagegrabError::Lookup("no archived snapshot available".to_string()),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Direct(e) => write!(f, "direct retrieval failed: {e}"),
            Cause::ArchiveLookup(e) => write!(f, "archive lookup failed: {e}"),
            Cause::ArchiveMiss => f.write_str("no archived snapshot available"),
            Cause::ArchivedNavigation { snapshot_url, error } => {
                write!(f, "archived snapshot {snapshot_url} failed: {error}")
            }
            Cause::Capture(e) => write!(f, "screenshot failed: {e}"),
        }
    }
}

enum Transition {
    Complete(RetrievalOutcome),
    Advance(Cause),
}

/// Lazily opened browser session, owned by one run.
///
/// The browser is launched at most once per run: a failed launch is
/// remembered and reported again to every later stage.
struct SessionSlot<'r> {
    renderer: &'r dyn Renderer,
    session: Option<Box<dyn RenderSession>>,
    launch_failure: Option<String>,
}

impl<'r> SessionSlot<'r> {
    fn new(renderer: &'r dyn Renderer) -> Self {
        Self { renderer, session: None, launch_failure: None }
    }

    async fn get(&mut self) -> Result<&mut Box<dyn RenderSession>> {
        if let Some(reason) = &self.launch_failure {
            return Err(PagegrabError::Browser(reason.clone()));
        }

        let session = match self.session.take() {
            Some(session) => session,
            None => {
                debug!("opening browser session");
                match self.renderer.open().await {
                    Ok(session) => session,
                    Err(e) => {
                        self.launch_failure = Some(e.to_string());
                        return Err(e);
                    }
                }
            }
        };
        Ok(self.session.insert(session))
    }

    async fn release(self) {
        if let Some(session) = self.session
            && let Err(e) = session.close().await
        {
            warn!(error = %e, "failed to close browser session");
        }
    }
}

/// Escalating retriever for a single article.
pub struct Retriever<R, A> {
    renderer: R,
    archive: A,
    config: RetrievalConfig,
}

impl<R: Renderer, A: ArchiveLookup> Retriever<R, A> {
    pub fn new(renderer: R, archive: A) -> Self {
        Self::with_config(renderer, archive, RetrievalConfig::default())
    }

    pub fn with_config(renderer: R, archive: A, config: RetrievalConfig) -> Self {
        Self { renderer, archive, config }
    }

    /// Retrieves `request.target_url()` and writes the artifact to
    /// `request.output_path()`.
    ///
    /// The browser session is opened on first use and closed before this
    /// returns, whatever the result. The output file is written once, only
    /// after a strategy succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`PagegrabError::Exhausted`] when every strategy failed, or
    /// [`PagegrabError::WriteError`] if the output file cannot be written.
    pub async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalOutcome> {
        let mut slot = SessionSlot::new(&self.renderer);
        let result = self.run(request, &mut slot).await;
        slot.release().await;

        let outcome = result?;
        fs::write(request.output_path(), &outcome.html)?;

        info!(
            method = %outcome.method,
            source_url = %outcome.source_url,
            output = %request.output_path().display(),
            "retrieval complete"
        );

        Ok(outcome)
    }

    async fn run(&self, request: &RetrievalRequest, slot: &mut SessionSlot<'_>) -> Result<RetrievalOutcome> {
        let mut stage = Stage::Direct;

        loop {
            debug!(%stage, url = request.target_url(), "attempting");

            let transition = match stage {
                Stage::Direct => self.attempt_direct(request, slot).await,
                Stage::Archived => self.attempt_archived(request, slot).await,
                Stage::Screenshot => self.attempt_screenshot(request, slot).await,
            };

            match transition {
                Transition::Complete(outcome) => return Ok(outcome),
                Transition::Advance(cause) => match stage.next() {
                    Some(next) => {
                        warn!(%stage, %cause, "escalating to {next}");
                        stage = next;
                    }
                    None => return Err(cause.into_error().exhausted()),
                },
            }
        }
    }

    async fn attempt_direct(&self, request: &RetrievalRequest, slot: &mut SessionSlot<'_>) -> Transition {
        let url = request.target_url();
        match render(slot, url, self.config.direct_timeout).await {
            Ok(html) => Transition::Complete(RetrievalOutcome::rendered(RetrievalMethod::Direct, url, html)),
            Err(e) => Transition::Advance(Cause::Direct(e)),
        }
    }

    async fn attempt_archived(&self, request: &RetrievalRequest, slot: &mut SessionSlot<'_>) -> Transition {
        let snapshot = match self.archive.lookup(request.target_url()).await {
            Ok(snapshot) => snapshot,
            Err(e) => return Transition::Advance(Cause::ArchiveLookup(e)),
        };

        let Some(snapshot_url) = snapshot.url() else {
            return Transition::Advance(Cause::ArchiveMiss);
        };

        debug!(snapshot_url, "found archived snapshot");

        match render(slot, snapshot_url, self.config.archived_timeout).await {
            Ok(html) => Transition::Complete(RetrievalOutcome::rendered(RetrievalMethod::Archived, snapshot_url, html)),
            Err(error) => {
                Transition::Advance(Cause::ArchivedNavigation { snapshot_url: snapshot_url.to_string(), error })
            }
        }
    }

    async fn attempt_screenshot(&self, request: &RetrievalRequest, slot: &mut SessionSlot<'_>) -> Transition {
        let url = request.target_url();
        let path = request.screenshot_path();

        let session = match slot.get().await {
            Ok(session) => session,
            Err(e) => return Transition::Advance(Cause::Capture(e)),
        };

        if let Err(e) = session.navigate(url, WaitPolicy::DomParsed, self.config.screenshot_timeout).await {
            debug!(error = %e, "capturing partially loaded page");
        }

        match session.screenshot(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "captured screenshot");
                Transition::Complete(RetrievalOutcome::screenshot(url, path))
            }
            Err(e) => Transition::Advance(Cause::Capture(e)),
        }
    }
}

/// Navigates with the network-quiescent policy and returns the markup.
async fn render(slot: &mut SessionSlot<'_>, url: &str, timeout: Duration) -> Result<String> {
    let session = slot.get().await?;
    session.navigate(url, WaitPolicy::NetworkQuiescent, timeout).await?;

    let html = session.rendered_html().await?;
    if html.trim().is_empty() {
        return Err(PagegrabError::Navigation { url: url.to_string(), reason: "empty document".to_string() });
    }

    Ok(html)
}
