//! HTML parsing and element queries.
//!
//! This module wraps `scraper` in a small [`Document`]/[`Element`] pair
//! used by extraction. Parsing is lenient: any string yields a document,
//! following the HTML5 error-recovery rules.
//!
//! # Example
//!
//! ```rust
//! use pagegrab_core::parse::Document;
//!
//! let doc = Document::parse("<h1>Title</h1><p>Paragraph</p>");
//! let paragraphs = doc.select("p").unwrap();
//! assert_eq!(paragraphs[0].text(), "Paragraph");
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{PagegrabError, Result};

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Selects elements in document order using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PagegrabError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Returns the first element matching `selector`, if any.
    pub fn first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(Element::new))
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PagegrabError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A single element of a [`Document`].
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Concatenated text of all descendant text nodes, untrimmed.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Heading level for `h1`..`h6`, `None` for any other element.
    pub fn heading_level(&self) -> Option<u8> {
        match self.element.value().name() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }
}
