//! Crawler module
//!
//! The crawl loop (coordinator) plus its two collaborators: the HTTP
//! fetcher and the HTML link extractor.

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchOutcome, FetchedResponse};
pub use parser::extract_links;

use crate::config::CrawlOptions;
use crate::state::CrawlSummary;
use crate::Result;
use tokio::sync::watch;

/// Runs a complete crawl: builds a fresh or resumed session from the
/// options, walks the frontier until done, and returns the final counts.
/// The shutdown receiver delivers the cooperative interrupt signal.
pub async fn crawl(
    options: CrawlOptions,
    shutdown: watch::Receiver<bool>,
) -> Result<CrawlSummary> {
    run_crawl(options, shutdown).await
}
