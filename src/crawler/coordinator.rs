//! Crawl loop orchestration
//!
//! The coordinator owns the session, the HTTP client and the store, and
//! drives the per-iteration cycle: dequeue, fetch, classify the response,
//! dispatch discovered links, checkpoint. It processes the frontier
//! strictly sequentially with one outstanding fetch at a time; the only
//! suspension point is the fetcher call.

use crate::config::CrawlOptions;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchOutcome, FetchedResponse};
use crate::crawler::parser::extract_links;
use crate::state::{CrawlSession, CrawlSummary, FrontierEntry, Outcome};
use crate::storage::SessionStore;
use crate::url::{normalize, CanonicalUrl};
use crate::Result;
use reqwest::Client;
use tokio::sync::watch;
use url::Url;

/// Sessions are checkpointed every this many processed URLs, in addition to
/// the final flush on every exit path.
const SNAPSHOT_INTERVAL: u64 = 25;

/// Drives one crawl session to completion
pub struct Coordinator {
    options: CrawlOptions,
    session: CrawlSession,
    store: SessionStore,
    client: Client,
}

impl Coordinator {
    /// Builds a coordinator for a fresh or resumed session.
    ///
    /// With `resume`, the persisted session for the seed's host is restored
    /// (errored URLs get re-queued for another attempt) and a corrupted
    /// record is a hard failure. Without a persisted record, resume falls
    /// back to a first-time crawl.
    pub fn new(options: CrawlOptions) -> Result<Self> {
        let seed = normalize(&options.seed)?;
        let store = SessionStore::new(&options.state_dir);

        let session = if options.resume {
            match store.restore(seed.host())? {
                Some(mut session) => {
                    let retried = session.retry_errors();
                    tracing::info!(
                        "Resuming crawl of {}: {} queued, {} parsed, {} errors re-queued",
                        session.base_host(),
                        session.frontier_len(),
                        session.parsed_count(),
                        retried
                    );
                    session
                }
                None => {
                    tracing::warn!(
                        "No persisted session for {}, starting a fresh crawl",
                        seed.host()
                    );
                    CrawlSession::new(seed)
                }
            }
        } else {
            tracing::info!("Web crawl starting on seed {} ({})", seed, seed.host());
            CrawlSession::new(seed)
        };

        let client = build_http_client()?;

        Ok(Self {
            options,
            session,
            store,
            client,
        })
    }

    /// Runs the crawl loop until the frontier empties, the crawl limit is
    /// reached, the shutdown flag flips, or a connectivity failure aborts
    /// the run. Every exit path flushes the session, so the persisted state
    /// is always resumable.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<CrawlSummary> {
        let mut processed = 0u64;

        loop {
            if *shutdown.borrow() {
                tracing::info!("Interrupt received, stopping crawl");
                break;
            }

            if self.limit_reached() {
                tracing::info!(
                    "Crawl limit of {} parsed URLs reached",
                    self.session.parsed_count()
                );
                break;
            }

            let Some(entry) = self.session.dequeue() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            let client = self.client.clone();
            let target = entry.url.clone();
            let credentials = self.options.credentials.clone();

            let outcome = tokio::select! {
                outcome = fetch_url(&client, target.as_str(), credentials.as_ref()) => outcome,
                _ = wait_for_shutdown(&mut shutdown) => {
                    tracing::info!("Interrupted while fetching {}, re-queueing", entry.url);
                    self.session.requeue_front(entry);
                    break;
                }
            };

            match outcome {
                FetchOutcome::Connectivity(reason) => {
                    tracing::error!(
                        "Connectivity failure on {}: {}; stopping run",
                        entry.url,
                        reason
                    );
                    self.session.requeue_front(entry);
                    break;
                }
                FetchOutcome::Other(reason) => {
                    tracing::error!("Error processing URL: {} ({})", entry.url, reason);
                    self.session.mark_outcome(entry.url, Outcome::Error);
                }
                FetchOutcome::Response(response) => self.classify_response(entry, response),
            }

            processed += 1;
            if processed % SNAPSHOT_INTERVAL == 0 {
                self.store.snapshot(&self.session)?;
            }
        }

        self.store.snapshot(&self.session)?;

        let summary = self.session.summary();
        tracing::info!("SUMMARY - {}", summary);
        Ok(summary)
    }

    fn limit_reached(&self) -> bool {
        self.options
            .crawl_limit
            .is_some_and(|limit| self.session.parsed_count() as u64 >= limit)
    }

    /// Classifies one well-formed HTTP response:
    /// non-2xx/3xx ⇒ failed; ok redirect ⇒ follow the target without
    /// recording the redirecting URL as a success; ok non-HTML ⇒ files;
    /// ok HTML ⇒ parsed, then extract and dispatch links.
    fn classify_response(&mut self, entry: FrontierEntry, response: FetchedResponse) {
        self.session.add_bytes(response.body.len() as u64);
        tracing::info!(
            "CRAWLED - {} - {} - {:.2} Kb",
            entry.url,
            response.status,
            response.body.len() as f64 / 1024.0
        );

        if !response.ok() {
            tracing::debug!("FAILED - {}", entry.url);
            self.session.mark_outcome(entry.url, Outcome::Failed);
            return;
        }

        if let Some(location) = &response.redirect {
            if let Some(target) = resolve_redirect(&entry.url, location) {
                if self.session.enqueue(target.clone(), entry.depth) {
                    tracing::debug!("REDIRECT - {} -> {}", entry.url, target);
                }
            }
            return;
        }

        if !response.is_html() {
            tracing::debug!("FILES - {}", entry.url);
            self.session.mark_outcome(entry.url, Outcome::File);
            return;
        }

        self.session.mark_outcome(entry.url.clone(), Outcome::Parsed);

        if self
            .options
            .crawl_depth
            .is_some_and(|max| entry.depth >= max)
        {
            tracing::debug!("Depth limit reached at {}, not following links", entry.url);
            return;
        }

        self.dispatch_links(&entry, &response.body);
    }

    /// Classifies every link discovered on a parsed page: malformed links
    /// are dropped, already-seen links are no-ops, in-scope links join the
    /// frontier one level deeper, out-of-scope links are recorded external.
    fn dispatch_links(&mut self, entry: &FrontierEntry, body: &str) {
        let Ok(base) = Url::parse(entry.url.as_str()) else {
            return;
        };

        let found = extract_links(body, &base);
        tracing::debug!("Found {} URLs on {}", found.len(), entry.url);

        for link in found {
            let Ok(discovered) = normalize(&link) else {
                continue;
            };

            if self.session.is_in_scope(&discovered) {
                if self.session.enqueue(discovered.clone(), entry.depth + 1) {
                    tracing::debug!("QUEUED - {}", discovered);
                }
            } else if self.session.mark_outcome(discovered.clone(), Outcome::External) {
                tracing::debug!("EXTERNAL - {}", discovered);
            }
        }
    }

    /// Session accessor, mainly for assertions in tests
    pub fn session(&self) -> &CrawlSession {
        &self.session
    }
}

/// Resolves when the shutdown flag flips to true. A dropped sender can no
/// longer signal an interrupt, so that case never resolves.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves a Location header (possibly relative) against the redirecting
/// URL and normalizes the result
fn resolve_redirect(from: &CanonicalUrl, location: &str) -> Option<CanonicalUrl> {
    let base = Url::parse(from.as_str()).ok()?;
    let absolute = base.join(location.trim()).ok()?;
    normalize(absolute.as_str()).ok()
}

/// Runs a complete crawl with the given options; the watch receiver carries
/// the cooperative interrupt signal.
pub async fn run_crawl(
    options: CrawlOptions,
    shutdown: watch::Receiver<bool>,
) -> Result<CrawlSummary> {
    let mut coordinator = Coordinator::new(options)?;
    coordinator.run(shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: &str, redirect: Option<&str>, body: &str) -> FetchedResponse {
        FetchedResponse {
            status,
            content_type: content_type.to_string(),
            redirect: redirect.map(str::to_string),
            body: body.to_string(),
        }
    }

    fn coordinator_for(seed: &str) -> Coordinator {
        let options = CrawlOptions::new(seed);
        Coordinator {
            session: CrawlSession::new(normalize(seed).unwrap()),
            store: SessionStore::new(std::env::temp_dir()),
            client: build_http_client().unwrap(),
            options,
        }
    }

    fn dequeued(coordinator: &mut Coordinator) -> FrontierEntry {
        coordinator.session.dequeue().unwrap()
    }

    #[test]
    fn test_non_ok_status_marks_failed() {
        let mut c = coordinator_for("http://example.com/");
        let entry = dequeued(&mut c);
        c.classify_response(entry, response(404, "text/html", None, ""));

        assert_eq!(c.session.outcomes().failed.len(), 1);
        assert_eq!(c.session.parsed_count(), 0);
    }

    #[test]
    fn test_redirect_enqueues_target_without_parsing_source() {
        let mut c = coordinator_for("http://example.com/");
        let entry = dequeued(&mut c);
        c.classify_response(entry, response(301, "text/html", Some("/moved"), ""));

        assert_eq!(c.session.parsed_count(), 0);
        let next = dequeued(&mut c);
        assert_eq!(next.url.as_str(), "http://example.com/moved");
        assert_eq!(next.depth, 0);
    }

    #[test]
    fn test_redirect_to_seen_url_is_noop() {
        let mut c = coordinator_for("http://example.com/");
        let entry = dequeued(&mut c);
        c.session
            .mark_outcome(normalize("http://example.com/moved").unwrap(), Outcome::Parsed);
        c.classify_response(entry, response(302, "text/html", Some("/moved"), ""));

        assert!(c.session.frontier_is_empty());
    }

    #[test]
    fn test_non_html_marks_file() {
        let mut c = coordinator_for("http://example.com/");
        let entry = dequeued(&mut c);
        c.classify_response(entry, response(200, "application/pdf", None, ""));

        assert_eq!(c.session.outcomes().files.len(), 1);
        assert_eq!(c.session.parsed_count(), 0);
    }

    #[test]
    fn test_html_parses_and_dispatches_links() {
        let mut c = coordinator_for("http://example.com/");
        let entry = dequeued(&mut c);
        let body = r#"<html><body>
            <a href="/inside">In scope</a>
            <a href="http://evil.com/out">Out of scope</a>
            <a href="http:///broken">Malformed</a>
        </body></html>"#;
        c.classify_response(entry, response(200, "text/html; charset=utf-8", None, body));

        assert_eq!(c.session.parsed_count(), 1);
        assert_eq!(c.session.outcomes().external.len(), 1);
        assert_eq!(c.session.bytes_downloaded(), body.len() as u64);

        let queued = dequeued(&mut c);
        assert_eq!(queued.url.as_str(), "http://example.com/inside");
        assert_eq!(queued.depth, 1);
    }

    #[test]
    fn test_depth_limit_stops_link_dispatch() {
        let mut c = coordinator_for("http://example.com/");
        c.options.crawl_depth = Some(0);
        let entry = dequeued(&mut c);
        let body = r#"<html><body><a href="/deeper">Link</a></body></html>"#;
        c.classify_response(entry, response(200, "text/html", None, body));

        // Parsed, but the outlink is neither queued nor registered
        assert_eq!(c.session.parsed_count(), 1);
        assert!(c.session.frontier_is_empty());
        assert_eq!(c.session.seen_len(), 1);
    }

    #[test]
    fn test_limit_reached() {
        let mut c = coordinator_for("http://example.com/");
        c.options.crawl_limit = Some(1);
        assert!(!c.limit_reached());

        let entry = dequeued(&mut c);
        c.classify_response(entry, response(200, "text/html", None, "<html></html>"));
        assert!(c.limit_reached());
    }

    #[test]
    fn test_resolve_redirect_relative_and_absolute() {
        let from = normalize("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_redirect(&from, "/moved").unwrap().as_str(),
            "http://example.com/moved"
        );
        assert_eq!(
            resolve_redirect(&from, "HTTP://Other.com/X").unwrap().as_str(),
            "http://other.com/x"
        );
        assert!(resolve_redirect(&from, "http://").is_none());
    }
}
