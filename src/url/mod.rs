//! URL handling for webtrawl
//!
//! This module provides URL normalization and the crawl scope test used to
//! decide whether a discovered link stays on the site being crawled.

mod normalize;

pub use normalize::{normalize, CanonicalUrl};

/// Returns true when a discovered host is in scope for the crawl.
///
/// The scope rule is a substring match: a host is in scope iff it contains
/// the session's base host. This keeps subdomains in scope
/// (`sub.example.com` for base `example.com`) but also admits any host that
/// merely contains the base host as a substring
/// (`notexample.com.evil.org`). The looseness is intentional and preserved;
/// tightening it to suffix matching would change observable crawl scope.
pub fn in_scope(base_host: &str, host: &str) -> bool {
    host.contains(base_host)
}
