//! Run configuration: config-file loading and request resolution.
//!
//! Resolution is a pure function over its inputs so callers (the CLI, tests,
//! embedding applications) decide where the inputs come from. The
//! orchestrator never looks at argv or the filesystem for configuration.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::outcome::RetrievalRequest;
use crate::{PagegrabError, Result};

/// Config file read when no `--config=` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Output file used when neither a flag nor the config file names one.
pub const DEFAULT_OUTPUT_PATH: &str = "scrape.html";

/// Target used when no URL is supplied anywhere.
pub const DEFAULT_URL: &str = "https://grokipedia.com/page/2012_Aurora_theater_shooting";

/// Contents of the JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub url: Option<String>,
    pub scrape_output: Option<PathBuf>,
}

impl FileConfig {
    /// Parses config file content.
    ///
    /// # Errors
    ///
    /// Returns [`PagegrabError::Config`] if `content` is not a JSON object
    /// with the expected field types.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| PagegrabError::Config { path: path.to_path_buf(), reason: e.to_string() })
    }

    /// Loads the config file at `path`.
    ///
    /// A missing file yields `Ok(None)` so resolution falls through to the
    /// defaults; unreadable or malformed files are errors.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file");
                Ok(None)
            }
            Err(e) => Err(PagegrabError::Config { path: path.to_path_buf(), reason: e.to_string() }),
        }
    }
}

/// Every place a run's inputs can come from, highest precedence first.
#[derive(Debug, Clone, Default)]
pub struct RequestSources<'a> {
    /// URL passed programmatically by the caller.
    pub explicit_url: Option<&'a str>,
    /// First positional command-line argument.
    pub cli_url: Option<&'a str>,
    /// Output path given on the command line.
    pub cli_output: Option<&'a Path>,
    /// Parsed config file, if one was found.
    pub file: Option<&'a FileConfig>,
}

/// Resolves the request for one run.
///
/// URL precedence: explicit > command line > config file > [`DEFAULT_URL`].
/// Output precedence: command line > config `scrapeOutput` >
/// [`DEFAULT_OUTPUT_PATH`]. Blank strings count as absent.
///
/// # Errors
///
/// Returns [`PagegrabError::InvalidUrl`] if the winning URL is not absolute.
pub fn resolve_request(sources: &RequestSources<'_>) -> Result<RetrievalRequest> {
    let file_url = sources.file.and_then(|f| f.url.as_deref());

    let url = [sources.explicit_url, sources.cli_url, file_url]
        .into_iter()
        .flatten()
        .find(|u| !u.trim().is_empty())
        .unwrap_or(DEFAULT_URL);

    let output = sources
        .cli_output
        .map(Path::to_path_buf)
        .or_else(|| sources.file.and_then(|f| f.scrape_output.clone()))
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

    RetrievalRequest::new(url, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(url: Option<&str>, output: Option<&str>) -> FileConfig {
        FileConfig { url: url.map(String::from), scrape_output: output.map(PathBuf::from) }
    }

    #[test]
    fn test_defaults_without_sources() {
        let request = resolve_request(&RequestSources::default()).unwrap();
        assert_eq!(request.target_url(), DEFAULT_URL);
        assert_eq!(request.output_path(), Path::new(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn test_explicit_beats_cli_and_file() {
        let cfg = file(Some("https://file.example/"), None);
        let sources = RequestSources {
            explicit_url: Some("https://explicit.example/"),
            cli_url: Some("https://cli.example/"),
            file: Some(&cfg),
            ..Default::default()
        };
        assert_eq!(resolve_request(&sources).unwrap().target_url(), "https://explicit.example/");
    }

    #[test]
    fn test_cli_beats_file() {
        let cfg = file(Some("https://file.example/"), Some("from-file.html"));
        let sources = RequestSources { cli_url: Some("https://cli.example/"), file: Some(&cfg), ..Default::default() };
        let request = resolve_request(&sources).unwrap();
        assert_eq!(request.target_url(), "https://cli.example/");
        assert_eq!(request.output_path(), Path::new("from-file.html"));
    }

    #[test]
    fn test_file_url_used_when_cli_blank() {
        let cfg = file(Some("https://file.example/a"), None);
        let sources = RequestSources { cli_url: Some("  "), file: Some(&cfg), ..Default::default() };
        assert_eq!(resolve_request(&sources).unwrap().target_url(), "https://file.example/a");
    }

    #[test]
    fn test_cli_output_beats_file() {
        let cfg = file(None, Some("from-file.html"));
        let sources =
            RequestSources { cli_output: Some(Path::new("flag.html")), file: Some(&cfg), ..Default::default() };
        assert_eq!(resolve_request(&sources).unwrap().output_path(), Path::new("flag.html"));
    }

    #[test]
    fn test_invalid_winning_url() {
        let sources = RequestSources { cli_url: Some("not a url"), ..Default::default() };
        assert!(matches!(resolve_request(&sources), Err(PagegrabError::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_camel_case_fields() {
        let cfg = FileConfig::parse(
            r#"{"url": "https://example.com/", "scrapeOutput": "out.html"}"#,
            Path::new("config.json"),
        )
        .unwrap();
        assert_eq!(cfg, file(Some("https://example.com/"), Some("out.html")));
    }

    #[test]
    fn test_parse_malformed_is_config_error() {
        let result = FileConfig::parse("{ url: nope", Path::new("config.json"));
        assert!(matches!(result, Err(PagegrabError::Config { .. })));
    }

    #[test]
    fn test_parse_wrong_type_is_config_error() {
        let result = FileConfig::parse(r#"{"url": 42}"#, Path::new("config.json"));
        assert!(matches!(result, Err(PagegrabError::Config { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FileConfig::load(&dir.path().join("config.json")).unwrap(), None);
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"url": "https://example.com/x"}"#).unwrap();

        let cfg = FileConfig::load(&path).unwrap().unwrap();
        assert_eq!(cfg.url.as_deref(), Some("https://example.com/x"));
        assert_eq!(cfg.scrape_output, None);
    }
}
