//! Crawl session state: frontier, seen registry and outcome sets
//!
//! [`CrawlSession`] is the single owner of all mutable crawl state. Every
//! insertion into the frontier or an outcome set goes through its methods,
//! so no caller can bypass deduplication. The invariant it maintains: at any
//! instant a canonical URL belongs to at most one of {frontier, parsed,
//! failed, external, files, errors}, and the seen registry contains every
//! URL ever admitted to any of them.

use crate::state::{Outcome, OutcomeSets};
use crate::url::{in_scope, CanonicalUrl};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// A URL awaiting fetch, with the link depth at which it was discovered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub url: CanonicalUrl,
    pub depth: u32,
}

/// One crawl run's full state, keyed by base host
#[derive(Debug)]
pub struct CrawlSession {
    /// Scope of the crawl; fixed for the session's lifetime
    base_host: String,

    /// URLs awaiting fetch, FIFO for breadth-first ordering
    frontier: VecDeque<FrontierEntry>,

    /// Every URL ever admitted to the frontier or an outcome set.
    /// Memory-only; rebuilt from the persisted sets on resume.
    seen: HashSet<CanonicalUrl>,

    /// The five disjoint classification sets
    outcomes: OutcomeSets,

    /// Total bytes of response bodies downloaded this run
    bytes_downloaded: u64,
}

impl CrawlSession {
    /// Creates a fresh session scoped to the seed's host, with the seed
    /// queued at depth 0.
    pub fn new(seed: CanonicalUrl) -> Self {
        let mut session = Self {
            base_host: seed.host().to_string(),
            frontier: VecDeque::new(),
            seen: HashSet::new(),
            outcomes: OutcomeSets::default(),
            bytes_downloaded: 0,
        };
        session.enqueue(seed, 0);
        session
    }

    /// Rehydrates a session from persisted parts, rebuilding the seen
    /// registry as the union of the frontier and all outcome sets.
    pub fn from_parts(
        base_host: String,
        frontier: Vec<FrontierEntry>,
        outcomes: OutcomeSets,
    ) -> Self {
        let mut seen: HashSet<CanonicalUrl> =
            frontier.iter().map(|entry| entry.url.clone()).collect();
        seen.extend(outcomes.iter_all().cloned());

        Self {
            base_host,
            frontier: frontier.into(),
            seen,
            outcomes,
            bytes_downloaded: 0,
        }
    }

    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    /// Admits a URL to the frontier tail.
    ///
    /// Idempotent: returns false without queueing when the URL has already
    /// been seen (queued, parsed, failed, external, a file, or errored).
    pub fn enqueue(&mut self, url: CanonicalUrl, depth: u32) -> bool {
        if !self.seen.insert(url.clone()) {
            return false;
        }
        self.frontier.push_back(FrontierEntry { url, depth });
        true
    }

    /// Pops the frontier head. FIFO, so shallower pages are visited before
    /// deeper ones discovered later in the same pass.
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        self.frontier.pop_front()
    }

    /// Puts an in-flight entry back at the frontier head so it is retried
    /// first on resume. The entry must have been dequeued from this session;
    /// it is still in the seen registry and in no outcome set.
    pub fn requeue_front(&mut self, entry: FrontierEntry) {
        debug_assert!(self.seen.contains(&entry.url));
        self.frontier.push_front(entry);
    }

    /// Records a terminal outcome for a URL.
    ///
    /// Returns false without recording when the URL has already been seen;
    /// once an outcome is recorded it is never overwritten by a later
    /// attempt.
    pub fn mark_outcome(&mut self, url: CanonicalUrl, outcome: Outcome) -> bool {
        if !self.seen.insert(url.clone()) {
            return false;
        }
        self.outcomes.set_mut(outcome).insert(url);
        true
    }

    /// Drains the `errors` set back into the frontier for another attempt.
    ///
    /// Errors are the one revisitable outcome; resuming a session reattempts
    /// them. The original discovery depth is not persisted for errored URLs,
    /// so they re-enter at depth 0. Returns the number of URLs re-queued.
    pub fn retry_errors(&mut self) -> usize {
        let errored: Vec<CanonicalUrl> = self.outcomes.errors.drain().collect();
        let count = errored.len();
        for url in errored {
            self.seen.remove(&url);
            self.enqueue(url, 0);
        }
        count
    }

    /// Applies the substring scope rule against the session's base host.
    pub fn is_in_scope(&self, url: &CanonicalUrl) -> bool {
        in_scope(&self.base_host, url.host())
    }

    pub fn add_bytes(&mut self, n: u64) {
        self.bytes_downloaded += n;
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.bytes_downloaded
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn frontier_is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Frontier entries in queue order (for persistence)
    pub fn frontier_entries(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.frontier.iter()
    }

    pub fn outcomes(&self) -> &OutcomeSets {
        &self.outcomes
    }

    pub fn parsed_count(&self) -> usize {
        self.outcomes.parsed.len()
    }

    /// Number of URLs in the seen registry
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            parsed: self.outcomes.parsed.len(),
            queued: self.frontier.len(),
            failed: self.outcomes.failed.len(),
            files: self.outcomes.files.len(),
            external: self.outcomes.external.len(),
            errors: self.outcomes.errors.len(),
            bytes_downloaded: self.bytes_downloaded,
        }
    }
}

/// End-of-run counts reported to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub parsed: usize,
    pub queued: usize,
    pub failed: usize,
    pub files: usize,
    pub external: usize,
    pub errors: usize,
    pub bytes_downloaded: u64,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Crawled: {}, Queued: {}, Failed: {}, Files: {}, External: {}, Errors: {}, Total downloaded: {:.2} Kb",
            self.parsed,
            self.queued,
            self.failed,
            self.files,
            self.external,
            self.errors,
            self.bytes_downloaded as f64 / 1024.0
        )
    }
}
