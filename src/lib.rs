//! Webtrawl: a breadth-first site crawler
//!
//! This crate implements a web crawler that walks every page of a site
//! reachable from a seed URL, classifies each fetched resource, and
//! checkpoints its state so an interrupted crawl can be resumed.

pub mod config;
pub mod crawler;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for webtrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Errors from the session persistence layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted session record {path}: {source}")]
    Corrupted {
        path: String,
        source: serde_json::Error,
    },
}

/// Result type alias for webtrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// Re-export commonly used types
pub use config::{CrawlOptions, Credentials};
pub use crawler::{crawl, Coordinator};
pub use state::{CrawlSession, CrawlSummary, FrontierEntry, Outcome};
pub use url::{in_scope, normalize, CanonicalUrl};
