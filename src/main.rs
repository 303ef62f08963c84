//! Asset-Spider main entry point
//!
//! This is the command-line interface for the Asset-Spider crawler and downloader.

use asset_spider::browser::renderer_for;
use asset_spider::config::{load_config, Config, DEFAULT_CONFIG_PATH};
use asset_spider::output::{print_crawl_summary, print_download_summary};
use asset_spider::{AssetMap, Coordinator, DownloadManager, HttpClient, Progress, ProgressMode};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Asset-Spider: crawl sites and download the assets they reference
///
/// Asset-Spider crawls every seed URL, follows links that stay on the seed's
/// domain, collects URLs with the requested file extensions (rendering pages
/// in a headless browser when nothing is found statically) and downloads
/// them into one directory per domain.
#[derive(Parser, Debug)]
#[command(name = "asset-spider")]
#[command(version = "1.0.0")]
#[command(about = "Domain-scoped asset crawler and downloader", long_about = None)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl and list the discovered assets without downloading them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => {
            tracing::info!(
                "Configuration loaded: {} seed(s), browser {}",
                cfg.urls.len(),
                cfg.browser
            );
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let client = HttpClient::new(&config)?;

    let assets = handle_crawl(&config, client.clone(), cli.quiet).await?;

    print_crawl_summary(&assets, cli.dry_run);
    if cli.dry_run {
        tracing::info!("Dry run: skipping downloads");
        return Ok(());
    }

    handle_download(&config, client, &assets, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("asset_spider=info,warn"),
            1 => EnvFilter::new("asset_spider=debug,info"),
            2 => EnvFilter::new("asset_spider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_for(mode: ProgressMode, quiet: bool) -> Progress {
    if quiet {
        Progress::hidden(mode)
    } else {
        Progress::new(mode)
    }
}

/// Runs the crawl phase
async fn handle_crawl(
    config: &Config,
    client: HttpClient,
    quiet: bool,
) -> Result<AssetMap, Box<dyn std::error::Error>> {
    let renderer = renderer_for(config)?;
    let coordinator = Coordinator::new(
        config,
        client,
        renderer,
        progress_for(ProgressMode::Tasks, quiet),
    );

    match coordinator.start().await {
        Ok(assets) => {
            if assets.asset_count() == 0 {
                tracing::warn!("Crawl finished without finding any assets");
            }
            Ok(assets)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Runs the download phase
async fn handle_download(
    config: &Config,
    client: HttpClient,
    assets: &AssetMap,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let manager = DownloadManager::new(
        &config.target,
        client,
        config.download_concurrency,
        progress_for(ProgressMode::Files, quiet),
    );

    match manager.start(assets).await {
        Ok(summary) => {
            print_download_summary(&summary, manager.target());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Download failed: {}", e);
            Err(e.into())
        }
    }
}
