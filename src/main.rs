//! Webtrawl main entry point
//!
//! Command-line interface for the breadth-first site crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use webtrawl::config::{CrawlOptions, Credentials};
use webtrawl::crawler::crawl;

/// Webtrawl: a breadth-first site crawler
///
/// Starting from a seed URL, webtrawl fetches every in-scope page reachable
/// by following hyperlinks, classifies each resource it encounters, and
/// checkpoints its state so an interrupted crawl can be resumed.
#[derive(Parser, Debug)]
#[command(name = "webtrawl")]
#[command(version)]
#[command(about = "Breadth-first site crawler", long_about = None)]
struct Cli {
    /// URL to start crawling
    #[arg(short = 'u', long)]
    url: String,

    /// Resume an existing crawling session
    #[arg(short = 'r', long)]
    resume: bool,

    /// Maximum URLs to parse before stopping (unbounded when omitted)
    #[arg(short = 'l', long, value_name = "N")]
    crawl_limit: Option<u64>,

    /// Maximum link-following depth (unbounded when omitted)
    #[arg(short = 'C', long, value_name = "N")]
    crawl_depth: Option<u32>,

    /// User name for basic authentication
    #[arg(short = 'U', long, requires = "password")]
    username: Option<String>,

    /// Password for basic authentication
    #[arg(short = 'P', long, requires = "username")]
    password: Option<String>,

    /// Be verbose
    #[arg(short = 'v', long, conflicts_with = "debug")]
    verbose: bool,

    /// Enable debug logging
    #[arg(short = 'D', long)]
    debug: bool,

    /// Directory for persisted session state
    #[arg(long, default_value = "logs", value_name = "DIR")]
    state_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.debug);

    let credentials = match (cli.username, cli.password) {
        (Some(username), Some(password)) => Some(Credentials { username, password }),
        _ => None,
    };

    let options = CrawlOptions {
        seed: cli.url,
        resume: cli.resume,
        crawl_limit: cli.crawl_limit,
        crawl_depth: cli.crawl_depth,
        credentials,
        state_dir: cli.state_dir,
    };

    // Ctrl-C flips the shutdown flag; the crawl loop observes it between
    // iterations, re-queues any in-flight URL and flushes before exiting.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = crawl(options, shutdown_rx)
        .await
        .context("crawl failed")?;

    tracing::info!("Run finished - {}", summary);
    Ok(())
}

/// Sets up the tracing subscriber from the verbosity flags
fn setup_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("webtrawl=trace,debug")
    } else if verbose {
        EnvFilter::new("webtrawl=debug,info")
    } else {
        EnvFilter::new("webtrawl=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
