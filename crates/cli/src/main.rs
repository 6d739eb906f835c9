use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use pagegrab_core::{
    CHROMIUM_PATH_ENV, ChromiumConfig, ChromiumRenderer, DEFAULT_CONFIG_PATH, FetchConfig, FileConfig, PagegrabError,
    RequestSources, RetrievalConfig, Retriever, WaybackClient, resolve_request,
};
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Retrieve a web article, falling back to an archived snapshot and then a screenshot
#[derive(Parser, Debug)]
#[command(name = "pagegrab")]
#[command(version)]
#[command(about = "Retrieve a web article with archive and screenshot fallbacks", long_about = None)]
struct Args {
    /// URL to retrieve (takes precedence over the config file)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// JSON config file with `url` and optional `scrapeOutput`
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: PathBuf,

    /// Output file (default: `scrapeOutput` from the config, or scrape.html)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the outcome and extraction summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Chromium executable (default: $PAGEGRAB_CHROMIUM_PATH or PATH lookup)
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,

    /// Navigation timeout for the direct and archived attempts, in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Navigation timeout before the fallback screenshot, in seconds
    #[arg(long, default_value = "15", value_name = "SECS")]
    screenshot_timeout: u64,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pagegrab_core=debug,pagegrab=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "pagegrab", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
    }

    let file = FileConfig::load(&args.config).context("Failed to load configuration")?;
    let request = resolve_request(&RequestSources {
        explicit_url: None,
        cli_url: args.url.as_deref(),
        cli_output: args.output.as_deref(),
        file: file.as_ref(),
    })
    .context("Invalid retrieval request")?;

    echo::print_step(
        1,
        3,
        &format!("Retrieving {}", request.target_url().bright_white().underline()),
    );

    let renderer = ChromiumRenderer::new(ChromiumConfig { executable: args.chrome.clone(), ..Default::default() });
    let archive = WaybackClient::new(FetchConfig::default()).context("Failed to build archive client")?;
    let config = RetrievalConfig::builder()
        .direct_timeout(Duration::from_secs(args.timeout))
        .archived_timeout(Duration::from_secs(args.timeout))
        .screenshot_timeout(Duration::from_secs(args.screenshot_timeout))
        .build();

    let outcome = match Retriever::with_config(renderer, archive, config).retrieve(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let PagegrabError::Exhausted { cause } = &e
                && cause.is_navigation()
            {
                echo::print_warning(&format!("No browser could be started; pass --chrome or set {CHROMIUM_PATH_ENV}"));
            }
            return Err(e).context("Failed to retrieve page");
        }
    };

    echo::print_outcome(&outcome);

    echo::print_step(2, 3, "Extracting structure");
    let summary = outcome.summary();
    match &summary {
        Some(summary) => echo::print_summary(summary),
        None => echo::print_warning("Only a screenshot was captured; nothing to extract"),
    }

    echo::print_step(3, 3, "Writing output");
    echo::print_success(&format!(
        "Content saved to {}",
        request.output_path().display().bright_white()
    ));

    if args.json {
        let report = serde_json::json!({
            "outcome": outcome,
            "output": request.output_path(),
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize report")?);
    }

    Ok(())
}
