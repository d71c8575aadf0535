//! Everystocks crawler entry point
//!
//! Crawls the calendar, then registers every extracted event.

use anyhow::Context;
use clap::Parser;
use everystocks_crawler::config::{load_config_with_hash, Config};
use everystocks_crawler::crawler::{build_http_client, run_crawl, Coordinator};
use everystocks_crawler::output::{print_statistics, write_events_json, CrawlStatistics};
use everystocks_crawler::registration::{submit_all, HttpRegistrar};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Everystocks calendar crawler
///
/// Scrapes the monthly stock-event calendar of everystocks.com, extracts
/// every event with its article body, and submits the events to the
/// registration server.
#[derive(Parser, Debug)]
#[command(name = "everystocks-crawler")]
#[command(version)]
#[command(about = "Stock calendar crawler for everystocks.com", long_about = None)]
struct Cli {
    /// Optional TOML configuration file (built-in defaults otherwise)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the resolved configuration and calendar URLs without crawling
    #[arg(long, conflicts_with_all = ["no_submit", "export"])]
    dry_run: bool,

    /// Crawl but do not submit events to the registration server
    #[arg(long)]
    no_submit: bool,

    /// Also write the crawled events to this JSON file
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(config)
    } else {
        handle_crawl(config, cli.no_submit, cli.export).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("everystocks_crawler=info,warn"),
            1 => EnvFilter::new("everystocks_crawler=debug,info"),
            2 => EnvFilter::new("everystocks_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: Config) -> anyhow::Result<()> {
    println!("=== Everystocks Crawler Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!(
        "  Window: {} .. {}",
        config.source.start_date, config.source.end_date
    );
    println!("  Event scope: {:?}", config.source.event_scope);

    println!("\nFetcher:");
    println!("  Max attempts: {}", config.fetcher.max_attempts);
    println!("  Retry delay: {}ms", config.fetcher.retry_delay_ms);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!(
        "  Max concurrent events: {}",
        config.crawler.max_concurrent_events
    );

    println!("\nRegistration:");
    println!("  Endpoint: {}", config.registration.endpoint);
    println!("  Delay: {}ms", config.registration.submit_delay_ms);
    println!("  Test mode: {}", config.registration.test_mode);

    let coordinator = Coordinator::new(config)?;
    let urls = coordinator.calendar_urls();

    println!("\nCalendar pages ({}):", urls.len());
    for url in &urls {
        println!("  * {}", url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl and registration run
async fn handle_crawl(
    config: Config,
    no_submit: bool,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let registration = config.registration.clone();
    let registrar = HttpRegistrar::new(
        build_http_client(&config.fetcher, &config.user_agent)?,
        &registration,
    );

    let events = match run_crawl(config).await {
        Ok(events) => events,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if let Some(path) = &export {
        write_events_json(&events, path)
            .with_context(|| format!("failed to export events to {}", path.display()))?;
    }

    let report = if no_submit {
        tracing::info!("Skipping registration of {} events", events.len());
        None
    } else {
        tracing::info!("Registering {} events at {}", events.len(), registrar.endpoint());
        Some(
            submit_all(
                &events,
                &registrar,
                Duration::from_millis(registration.submit_delay_ms),
            )
            .await,
        )
    };

    print_statistics(&CrawlStatistics::from_events(&events), report.as_ref());
    Ok(())
}
