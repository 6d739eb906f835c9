//! Structural summary of a rendered document.
//!
//! Extraction is deliberately shallow: it reports the first `h1`, every
//! paragraph and every heading, in document order. No scoring, no cleanup.

use serde::Serialize;

use crate::parse::Document;

/// Title reported when the document has no level-1 heading, or an empty one.
pub const NO_TITLE: &str = "No title found";

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

/// A heading element with its level (1..=6) and trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// Title, paragraphs and headings of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub title: String,
    pub paragraphs: Vec<String>,
    pub headings: Vec<Heading>,
}

/// Extracts a summary from rendered markup.
///
/// Must only be called on real rendered documents; see
/// [`RetrievalOutcome::summary`](crate::RetrievalOutcome::summary).
pub fn extract(html: &str) -> ExtractionSummary {
    extract_document(&Document::parse(html))
}

/// Extracts a summary from an already parsed document.
///
/// The title is the text of the first `h1` exactly as it appears, whitespace
/// included; paragraph and heading texts are trimmed.
pub fn extract_document(doc: &Document) -> ExtractionSummary {
    let title = doc
        .first("h1")
        .ok()
        .flatten()
        .map(|h1| h1.text())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let paragraphs = doc
        .select("p")
        .unwrap_or_default()
        .iter()
        .map(|p| p.text().trim().to_string())
        .collect();

    let headings = doc
        .select(HEADING_SELECTOR)
        .unwrap_or_default()
        .iter()
        .filter_map(|h| h.heading_level().map(|level| Heading { level, text: h.text().trim().to_string() }))
        .collect();

    ExtractionSummary { title, paragraphs, headings }
}
