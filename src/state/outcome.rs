//! Outcome classification for fetched URLs
//!
//! Every URL that leaves the frontier ends up in exactly one of five
//! disjoint outcome sets.

use crate::url::CanonicalUrl;
use std::collections::HashSet;
use std::fmt;

/// Terminal (or semi-terminal) classification of a crawled URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Successfully fetched in-scope HTML page
    Parsed,

    /// Response with a non-2xx/3xx HTTP status
    Failed,

    /// Discovered link whose host is out of scope
    External,

    /// In-scope resource with a non-HTML content type
    File,

    /// Processing raised an unexpected fault; revisitable on resume
    Error,
}

impl Outcome {
    /// Stable record name used for persisted session files
    pub fn as_record_name(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Failed => "failed",
            Self::External => "external",
            Self::File => "files",
            Self::Error => "errors",
        }
    }

    /// Parses an outcome from its persisted record name
    pub fn from_record_name(s: &str) -> Option<Self> {
        match s {
            "parsed" => Some(Self::Parsed),
            "failed" => Some(Self::Failed),
            "external" => Some(Self::External),
            "files" => Some(Self::File),
            "errors" => Some(Self::Error),
            _ => None,
        }
    }

    /// All outcome variants, in persisted-record order
    pub fn all() -> [Self; 5] {
        [
            Self::Parsed,
            Self::Failed,
            Self::External,
            Self::File,
            Self::Error,
        ]
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_record_name())
    }
}

/// The five disjoint outcome sets of a crawl session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeSets {
    pub parsed: HashSet<CanonicalUrl>,
    pub failed: HashSet<CanonicalUrl>,
    pub external: HashSet<CanonicalUrl>,
    pub files: HashSet<CanonicalUrl>,
    pub errors: HashSet<CanonicalUrl>,
}

impl OutcomeSets {
    /// Borrows the set for an outcome
    pub fn set(&self, outcome: Outcome) -> &HashSet<CanonicalUrl> {
        match outcome {
            Outcome::Parsed => &self.parsed,
            Outcome::Failed => &self.failed,
            Outcome::External => &self.external,
            Outcome::File => &self.files,
            Outcome::Error => &self.errors,
        }
    }

    /// Mutably borrows the set for an outcome
    pub fn set_mut(&mut self, outcome: Outcome) -> &mut HashSet<CanonicalUrl> {
        match outcome {
            Outcome::Parsed => &mut self.parsed,
            Outcome::Failed => &mut self.failed,
            Outcome::External => &mut self.external,
            Outcome::File => &mut self.files,
            Outcome::Error => &mut self.errors,
        }
    }

    /// Iterates every URL across all five sets
    pub fn iter_all(&self) -> impl Iterator<Item = &CanonicalUrl> {
        Outcome::all()
            .into_iter()
            .flat_map(move |o| self.set(o).iter())
    }

    /// Total number of classified URLs
    pub fn len(&self) -> usize {
        Outcome::all().iter().map(|o| self.set(*o).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
