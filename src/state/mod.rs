//! Crawl state tracking
//!
//! Outcome classification sets plus the session that owns the frontier and
//! the seen registry.

mod outcome;
mod session;

pub use outcome::{Outcome, OutcomeSets};
pub use session::{CrawlSession, CrawlSummary, FrontierEntry};
