//! Request and outcome types for a single retrieval run.
//!
//! A [`RetrievalRequest`] is the immutable input to one run of the
//! [`Retriever`](crate::Retriever); a [`RetrievalOutcome`] is the single
//! artifact that run produced, tagged with the [`RetrievalMethod`] that
//! obtained it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::extract::{ExtractionSummary, extract};
use crate::{PagegrabError, Result};

/// Suffix appended to the output file stem for the screenshot image.
pub const SCREENSHOT_SUFFIX: &str = "_screenshot.png";

/// Input to one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    target_url: String,
    output_path: PathBuf,
}

impl RetrievalRequest {
    /// Creates a request, validating that `target_url` is absolute.
    ///
    /// The URL is kept as given (minus surrounding whitespace); parsing only
    /// validates it.
    ///
    /// # Errors
    ///
    /// Returns [`PagegrabError::InvalidUrl`] if the URL is empty, relative or
    /// does not use an http(s) scheme.
    pub fn new(target_url: &str, output_path: impl Into<PathBuf>) -> Result<Self> {
        let trimmed = target_url.trim();
        if trimmed.is_empty() {
            return Err(PagegrabError::InvalidUrl("URL must not be empty".to_string()));
        }

        let parsed = Url::parse(trimmed).map_err(|e| PagegrabError::InvalidUrl(format!("{trimmed}: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PagegrabError::InvalidUrl(format!(
                "{trimmed}: scheme must be http or https"
            )));
        }

        Ok(Self { target_url: trimmed.to_string(), output_path: output_path.into() })
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Path the screenshot fallback writes its image to.
    pub fn screenshot_path(&self) -> PathBuf {
        screenshot_path_for(&self.output_path)
    }
}

/// Strategy that produced a [`RetrievalOutcome`], in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    Direct,
    Archived,
    Screenshot,
}

impl RetrievalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMethod::Direct => "direct",
            RetrievalMethod::Archived => "archived",
            RetrievalMethod::Screenshot => "screenshot",
        }
    }
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The artifact a run produced.
///
/// `html` is always populated: rendered markup for direct and archived
/// retrievals, a synthesized placeholder for screenshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalOutcome {
    pub method: RetrievalMethod,
    pub source_url: String,
    #[serde(skip)]
    pub html: String,
    pub screenshot_path: Option<PathBuf>,
}

impl RetrievalOutcome {
    pub(crate) fn rendered(method: RetrievalMethod, source_url: impl Into<String>, html: String) -> Self {
        Self { method, source_url: source_url.into(), html, screenshot_path: None }
    }

    pub(crate) fn screenshot(source_url: impl Into<String>, screenshot_path: PathBuf) -> Self {
        let source_url = source_url.into();
        let html = placeholder_document(&source_url, &screenshot_path);
        Self { method: RetrievalMethod::Screenshot, source_url, html, screenshot_path: Some(screenshot_path) }
    }

    /// True when `html` is real rendered markup rather than a placeholder.
    pub fn is_rendered(&self) -> bool {
        self.method != RetrievalMethod::Screenshot
    }

    /// Structural summary of the rendered document.
    ///
    /// Returns `None` for screenshot outcomes: the placeholder document is
    /// never extracted.
    pub fn summary(&self) -> Option<ExtractionSummary> {
        self.is_rendered().then(|| extract(&self.html))
    }
}

/// Derives the screenshot image path from the HTML output path.
///
/// The extension of `output` is replaced by [`SCREENSHOT_SUFFIX`], so
/// `scrape.html` becomes `scrape_screenshot.png` in the same directory.
pub fn screenshot_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scrape".to_string());

    output.with_file_name(format!("{stem}{SCREENSHOT_SUFFIX}"))
}

/// Builds the minimal HTML document that stands in for unobtainable content.
///
/// The image is linked by file name, since it is written next to the
/// document; the full path only appears in the notice text.
pub fn placeholder_document(source_url: &str, screenshot_path: &Path) -> String {
    let url = escape_html(source_url);
    let path = escape_html(&screenshot_path.display().to_string());
    let image = screenshot_path
        .file_name()
        .map(|name| escape_html(&name.to_string_lossy()))
        .unwrap_or_else(|| path.clone());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Screenshot of {url}</title>
</head>
<body>
<p class="notice">The page content could not be retrieved directly or from a web archive. A screenshot was captured instead.</p>
<p>Original URL: <a href="{url}">{url}</a></p>
<p>Screenshot saved to {path}: <a href="{image}">{image}</a></p>
<img src="{image}" alt="Screenshot of {url}">
</body>
</html>
"#
    )
}

/// Escapes the characters that would break out of text or attribute context.
///
/// `&` is left alone so the URL stays byte-identical inside the placeholder.
fn escape_html(value: &str) -> String {
    value.replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_relative_url() {
        let result = RetrievalRequest::new("example.com/article", "scrape.html");
        assert!(matches!(result, Err(PagegrabError::InvalidUrl(_))));
    }

    #[test]
    fn test_request_rejects_empty_url() {
        let result = RetrievalRequest::new("   ", "scrape.html");
        assert!(matches!(result, Err(PagegrabError::InvalidUrl(_))));
    }

    #[test]
    fn test_request_rejects_non_http_scheme() {
        let result = RetrievalRequest::new("ftp://example.com/file", "scrape.html");
        assert!(matches!(result, Err(PagegrabError::InvalidUrl(_))));
    }

    #[test]
    fn test_request_accessors() {
        let request = RetrievalRequest::new("https://example.com/page/Article", "out/page.html").unwrap();
        assert_eq!(request.target_url(), "https://example.com/page/Article");
        assert_eq!(request.output_path(), Path::new("out/page.html"));
        assert_eq!(request.screenshot_path(), PathBuf::from("out/page_screenshot.png"));
    }

    #[test]
    fn test_request_keeps_url_as_given() {
        let request = RetrievalRequest::new("  https://Example.com/Page?q=a b  ", "scrape.html").unwrap();
        assert_eq!(request.target_url(), "https://Example.com/Page?q=a b");

        let bare = RetrievalRequest::new("https://example.com", "scrape.html").unwrap();
        assert_eq!(bare.target_url(), "https://example.com");
    }

    #[test]
    fn test_screenshot_path_for_default_output() {
        assert_eq!(screenshot_path_for(Path::new("scrape.html")), PathBuf::from("scrape_screenshot.png"));
    }

    #[test]
    fn test_screenshot_path_without_extension() {
        assert_eq!(screenshot_path_for(Path::new("dump")), PathBuf::from("dump_screenshot.png"));
    }

    #[test]
    fn test_placeholder_embeds_provenance() {
        let html = placeholder_document("https://example.com/a?b=1&c=2", Path::new("scrape_screenshot.png"));
        assert!(html.contains("https://example.com/a?b=1&c=2"));
        assert!(html.contains("scrape_screenshot.png"));
        assert!(html.contains("could not be retrieved"));
    }

    #[test]
    fn test_placeholder_links_image_by_file_name() {
        let html = placeholder_document("https://example.com/", Path::new("out/page_screenshot.png"));
        assert!(html.contains(r#"<img src="page_screenshot.png""#));
        assert!(html.contains(r#"<a href="page_screenshot.png">"#));
        assert!(html.contains("Screenshot saved to out/page_screenshot.png"));
        assert!(!html.contains(r#"src="out/"#));
    }

    #[test]
    fn test_screenshot_outcome_has_no_summary() {
        let outcome = RetrievalOutcome::screenshot("https://example.com/", PathBuf::from("scrape_screenshot.png"));
        assert_eq!(outcome.method, RetrievalMethod::Screenshot);
        assert!(!outcome.html.is_empty());
        assert!(outcome.summary().is_none());
    }

    #[test]
    fn test_rendered_outcome_summary() {
        let outcome = RetrievalOutcome::rendered(
            RetrievalMethod::Direct,
            "https://example.com/",
            "<h1>Headline</h1><p>Body</p>".to_string(),
        );
        let summary = outcome.summary().expect("rendered outcomes are extracted");
        assert_eq!(summary.title, "Headline");
        assert_eq!(summary.paragraphs, vec!["Body".to_string()]);
    }

    #[test]
    fn test_method_order_and_display() {
        assert!(RetrievalMethod::Direct < RetrievalMethod::Archived);
        assert!(RetrievalMethod::Archived < RetrievalMethod::Screenshot);
        assert_eq!(RetrievalMethod::Archived.to_string(), "archived");
        assert_eq!(serde_json::to_string(&RetrievalMethod::Screenshot).unwrap(), r#""screenshot""#);
    }
}
