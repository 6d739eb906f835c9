use owo_colors::OwoColorize;
use pagegrab_core::{ExtractionSummary, RetrievalMethod, RetrievalOutcome};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "pagegrab".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Retrieve a web article, falling back to archives and screenshots\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled value, indented under the current step
pub fn print_field(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print which strategy produced the artifact
pub fn print_outcome(outcome: &RetrievalOutcome) {
    let method = match outcome.method {
        RetrievalMethod::Direct => outcome.method.as_str().green().to_string(),
        RetrievalMethod::Archived => outcome.method.as_str().yellow().to_string(),
        RetrievalMethod::Screenshot => outcome.method.as_str().red().to_string(),
    };

    eprintln!("  {} {}", "Method:".dimmed(), method);
    print_field("Source", &outcome.source_url);
    print_field("Size", &format_size(outcome.html.len()));
    if let Some(path) = &outcome.screenshot_path {
        print_field("Screenshot", &path.display().to_string());
    }
}

/// Print title and element counts of an extraction
pub fn print_summary(summary: &ExtractionSummary) {
    print_field("Title", &summary.title);
    print_field("Paragraphs", &summary.paragraphs.len().to_string());
    print_field("Headings", &summary.headings.len().to_string());
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
