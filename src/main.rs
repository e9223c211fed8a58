//! Gleaner main entry point
//!
//! This is the command-line interface for the Gleaner listing harvester.

use anyhow::{bail, Context};
use clap::Parser;
use gleaner::config::{load_config_with_hash, validate, Config, ReportFormat};
use gleaner::output::{write_report, Report, RunMetadata};
use gleaner::{build_search_url, Harvester, WebDriverSession};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Gleaner: an incremental listing harvester
///
/// Gleaner opens a search results feed in a browser driven over WebDriver,
/// scrolls it until enough listings have loaded, visits every listing's
/// detail page, and writes a ranked report.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version = "1.0.0")]
#[command(about = "An incremental listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the planned run without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Override the configured search query
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// Override the configured number of listings to extract
    #[arg(long, value_name = "N")]
    max_results: Option<usize>,

    /// Override the configured report format (markdown or json)
    #[arg(long, value_name = "FORMAT")]
    format: Option<ReportFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli).context("Invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config, &config_hash)
    } else {
        handle_harvest(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gleaner=info,warn"),
            1 => EnvFilter::new("gleaner=debug,info"),
            2 => EnvFilter::new("gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies CLI overrides and re-validates the result
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(query) = &cli.query {
        config.search.query = query.clone();
    }
    if let Some(max_results) = cli.max_results {
        config.crawler.max_results = max_results;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    validate(config)?;
    Ok(())
}

/// Handles the --dry-run mode: validates config and shows the planned run
fn handle_dry_run(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let search_url = build_search_url(&config.search.url_template, &config.search.query)?;

    println!("=== Gleaner Dry Run ===\n");

    println!("Search:");
    println!("  Query: {}", config.search.query);
    println!("  URL: {}", search_url);

    println!("\nCrawler Configuration:");
    println!("  Max results: {}", config.crawler.max_results);
    println!("  Stall limit: {}", config.crawler.stall_limit);
    println!("  Settle interval: {}ms", config.crawler.settle_interval);
    println!("  Page load timeout: {}ms", config.crawler.page_load_timeout);
    println!("  Detail settle: {}ms", config.crawler.detail_settle);
    println!("  Scroll step: {}px", config.crawler.scroll_step);

    println!("\nBrowser:");
    println!("  WebDriver: {}", config.browser.webdriver_url);
    println!("  Browser: {}", config.browser.browser_name);
    println!("  Headless: {}", config.browser.headless);
    println!("  Window size: {}", config.browser.window_size);
    println!("  Language: {}", config.browser.language);

    println!("\nSelectors:");
    println!("  Feed: {}", config.selectors.feed);
    println!("  Listing anchor: {}", config.selectors.listing_anchor);
    println!("  Name: {}", config.selectors.name);

    println!("\nOutput:");
    println!("  Report: {} ({})", config.output.report_path, config.output.format.as_str());
    if let Some(dump) = &config.output.debug_dump_path {
        println!("  Debug dump: {}", dump);
    }

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
    println!(
        "✓ Would harvest up to {} listings for \"{}\"",
        config.crawler.max_results, config.search.query
    );

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting up to {} listings for \"{}\"",
        config.crawler.max_results,
        config.search.query
    );

    let query = config.search.query.clone();
    let report_path = PathBuf::from(&config.output.report_path);
    let format = config.output.format;

    // Selectors compile before any browser is started
    let mut harvester = Harvester::new(config)?;

    let mut session = WebDriverSession::connect(
        &harvester.config().browser,
        harvester.config().crawler.page_load_timeout(),
        harvester.config().crawler.poll_interval(),
    )
    .await
    .with_context(|| {
        format!(
            "Failed to start browser session at {}",
            harvester.config().browser.webdriver_url
        )
    })?;

    let harvest = match harvester.run(&mut session).await {
        Ok(harvest) => harvest,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    if harvest.catalog.is_empty() {
        tracing::error!("No records were collected; no report written");
        bail!("harvest produced no records");
    }

    if harvest.is_partial() {
        tracing::warn!(
            "Collected {} of {} requested listings",
            harvest.catalog.len(),
            harvest.target
        );
    }

    let meta = RunMetadata::from_harvest(&harvest, &query, config_hash);
    let report = Report::assemble(&harvest.catalog, meta);
    write_report(&report, format, &report_path)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;

    tracing::info!(
        "Done: {} records, mean rating {:.2}",
        report.summary.count,
        report.summary.mean_rating
    );

    Ok(())
}
