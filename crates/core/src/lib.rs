pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod outcome;
pub mod parse;
pub mod render;
pub mod retrieve;

pub use archive::{AVAILABILITY_ENDPOINT, ArchiveLookup, ArchiveSnapshot, FetchConfig, WaybackClient, parse_availability};
pub use config::{
    DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_URL, FileConfig, RequestSources, resolve_request,
};
pub use error::{PagegrabError, Result};
pub use extract::{ExtractionSummary, Heading, NO_TITLE, extract, extract_document};
pub use outcome::{
    RetrievalMethod, RetrievalOutcome, RetrievalRequest, SCREENSHOT_SUFFIX, placeholder_document, screenshot_path_for,
};
pub use parse::Document;
#[cfg(feature = "chromium")]
pub use render::chromium::{CHROMIUM_PATH_ENV, ChromiumConfig, ChromiumRenderer, find_chromium};
pub use render::{RenderSession, Renderer, WaitPolicy};
pub use retrieve::{Cause, RetrievalConfig, RetrievalConfigBuilder, Retriever, Stage};
