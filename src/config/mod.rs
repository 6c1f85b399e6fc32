//! Crawl configuration
//!
//! Options are an explicit object handed to the coordinator; the crawler
//! holds no process-global configuration, so multiple sessions can run in
//! one process without cross-talk.

use std::path::PathBuf;

/// Options for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Seed URL the crawl starts from (also identifies the session on resume)
    pub seed: String,

    /// Load the persisted session for the seed's host instead of starting fresh
    pub resume: bool,

    /// Stop once this many URLs have been parsed; None means unbounded
    pub crawl_limit: Option<u64>,

    /// Do not follow links from pages at this depth; None means unbounded
    pub crawl_depth: Option<u32>,

    /// Basic-auth credentials passed through to the fetcher
    pub credentials: Option<Credentials>,

    /// Directory holding persisted session records
    pub state_dir: PathBuf,
}

impl CrawlOptions {
    /// Options with defaults for the given seed URL
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            resume: false,
            crawl_limit: None,
            crawl_depth: None,
            credentials: None,
            state_dir: PathBuf::from("logs"),
        }
    }
}

/// Basic-auth credentials for the fetcher
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unbounded() {
        let options = CrawlOptions::new("http://example.com/");
        assert!(options.crawl_limit.is_none());
        assert!(options.crawl_depth.is_none());
        assert!(options.credentials.is_none());
        assert!(!options.resume);
        assert_eq!(options.state_dir, PathBuf::from("logs"));
    }
}
