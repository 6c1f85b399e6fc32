//! Session persistence and resume
//!
//! A session snapshot is one JSON record per logical set, keyed by the
//! crawl's base host so crawls of different sites do not collide:
//! `<host>_queued.json` holds the ordered frontier (with depths), and
//! `<host>_{parsed,failed,external,files,errors}.json` hold the outcome
//! sets. Every record is written to a `.tmp` sibling and renamed into
//! place, so a crash mid-snapshot never corrupts records already on disk.

use crate::state::{CrawlSession, FrontierEntry, Outcome, OutcomeSets};
use crate::url::CanonicalUrl;
use crate::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const QUEUED_RECORD: &str = "queued";

/// Filesystem store for crawl session records
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Serializes the frontier and all five outcome sets to disk.
    ///
    /// Each record is replaced atomically; a failure part-way leaves every
    /// previously written record intact and readable.
    pub fn snapshot(&self, session: &CrawlSession) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;

        let frontier: Vec<&FrontierEntry> = session.frontier_entries().collect();
        write_record(
            &self.record_path(session.base_host(), QUEUED_RECORD),
            &frontier,
        )?;

        for outcome in Outcome::all() {
            let mut urls: Vec<&str> = session
                .outcomes()
                .set(outcome)
                .iter()
                .map(CanonicalUrl::as_str)
                .collect();
            urls.sort_unstable();
            write_record(
                &self.record_path(session.base_host(), outcome.as_record_name()),
                &urls,
            )?;
        }

        tracing::debug!(
            "Snapshot for {}: {} queued, {} classified",
            session.base_host(),
            frontier.len(),
            session.outcomes().len()
        );
        Ok(())
    }

    /// Restores the persisted session for a base host.
    ///
    /// Returns `Ok(None)` when no record exists at all (first-time crawl).
    /// When a record set exists, individual missing files are treated as
    /// empty, but an unreadable record is a hard error: silently starting
    /// fresh would drop the dedup guarantee and duplicate work already done.
    pub fn restore(&self, base_host: &str) -> StorageResult<Option<CrawlSession>> {
        if !self.has_records(base_host) {
            return Ok(None);
        }

        let frontier: Vec<FrontierEntry> =
            read_record(&self.record_path(base_host, QUEUED_RECORD))?.unwrap_or_default();

        let mut outcomes = OutcomeSets::default();
        for outcome in Outcome::all() {
            let urls: Vec<CanonicalUrl> =
                read_record(&self.record_path(base_host, outcome.as_record_name()))?
                    .unwrap_or_default();
            outcomes.set_mut(outcome).extend(urls);
        }

        Ok(Some(CrawlSession::from_parts(
            base_host.to_string(),
            frontier,
            outcomes,
        )))
    }

    /// True when any session record exists for the base host
    pub fn has_records(&self, base_host: &str) -> bool {
        if self.record_path(base_host, QUEUED_RECORD).exists() {
            return true;
        }
        Outcome::all()
            .iter()
            .any(|o| self.record_path(base_host, o.as_record_name()).exists())
    }

    fn record_path(&self, base_host: &str, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", sanitize_host(base_host), name))
    }
}

/// Maps a host to a filesystem-safe record key
fn sanitize_host(host: &str) -> String {
    host.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn write_record<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let tmp = path.with_extension("json.tmp");
    let encoded = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Corrupted {
        path: tmp.display().to_string(),
        source: e,
    })?;
    fs::write(&tmp, encoded)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_record<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StorageError::Corrupted {
            path: path.display().to_string(),
            source: e,
        })
}
