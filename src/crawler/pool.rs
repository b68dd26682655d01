//! Worker pool - concurrent crawl orchestration
//!
//! A fixed number of tokio tasks take URLs from the shared frontier. Every
//! URL is claimed in the visited set and counted in the pending-work counter
//! before it is put on the frontier, and the counter is decremented once its
//! processing finishes. The crawl is complete when the counter reaches zero.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::LinkExtractor;
use crate::frontier::Frontier;
use crate::output::{CrawlStats, CrawlSummary};
use crate::state::{PageOutcome, PendingCounter, PoolState, VisitedSet};
use crate::storage::ContentStore;
use crate::url::{normalize_url, store_path};
use crate::ShelobError;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Processed-URL interval between progress log lines
const PROGRESS_INTERVAL: u64 = 50;

/// Runs a crawl over a fixed set of workers
///
/// Cloning yields another handle to the same pool, so a crawl can be observed
/// from outside while [`WorkerPool::run`] is in progress.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    config: Config,
    frontier: Frontier<String>,
    visited: VisitedSet,
    pending: PendingCounter,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ContentStore>,
    extractor: Arc<dyn LinkExtractor>,
    stats: CrawlStats,
    state: Mutex<PoolState>,
}

impl WorkerPool {
    /// Creates a pool with a fresh frontier, visited set and pending counter
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn ContentStore>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self::with_state(
            config,
            Frontier::new(),
            VisitedSet::new(),
            PendingCounter::new(),
            fetcher,
            store,
            extractor,
        )
    }

    /// Creates a pool over caller-provided crawl state
    ///
    /// The visited set and pending counter are handles, so the caller keeps
    /// its own view of them while the crawl runs.
    pub fn with_state(
        config: Config,
        frontier: Frontier<String>,
        visited: VisitedSet,
        pending: PendingCounter,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn ContentStore>,
        extractor: Arc<dyn LinkExtractor>,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                config,
                frontier,
                visited,
                pending,
                fetcher,
                store,
                extractor,
                stats: CrawlStats::new(),
                state: Mutex::new(PoolState::Idle),
            }),
        }
    }

    /// Crawls from the configured base URL until all work is done or `cancel` fires
    ///
    /// Returns once every worker has exited. Cancellation is not an error; it
    /// is reported through [`CrawlSummary::cancelled`]. A pool runs at most
    /// once.
    pub async fn run(&self, cancel: CancellationToken) -> Result<CrawlSummary, ShelobError> {
        let started_at = Utc::now();

        let base = &self.inner.config.base_url;
        let seed = match normalize_url(base.as_str(), base) {
            Ok(url) => url.to_string(),
            Err(e) => {
                self.inner.transition(PoolState::Idle, PoolState::Stopped)?;
                return Err(ShelobError::InvalidBaseUrl {
                    url: base.to_string(),
                    source: e,
                });
            }
        };

        self.inner.transition(PoolState::Idle, PoolState::Running)?;
        tracing::info!(
            "Starting crawl of {} with {} workers",
            seed,
            self.inner.config.workers
        );

        self.inner.visited.try_claim(&seed);
        self.inner.pending.increment();
        self.inner.frontier.put(seed);

        let handles: Vec<JoinHandle<()>> = (0..self.inner.config.workers)
            .map(|id| {
                let inner = Arc::clone(&self.inner);
                let cancel = cancel.clone();
                tokio::spawn(async move { inner.work(id, cancel).await })
            })
            .collect();

        let cancelled = tokio::select! {
            biased;
            _ = cancel.cancelled() => true,
            _ = self.inner.pending.wait_zero() => false,
        };

        if cancelled {
            tracing::info!("Cancellation requested, waiting for workers to finish");
            self.inner.transition(PoolState::Running, PoolState::Cancelling)?;
        } else {
            tracing::debug!("No pending work left, draining workers");
            self.inner.transition(PoolState::Running, PoolState::Draining)?;
        }

        self.inner.frontier.close();

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let from = if cancelled {
            PoolState::Cancelling
        } else {
            PoolState::Draining
        };
        self.inner.transition(from, PoolState::Stopped)?;

        Ok(self.inner.summary(started_at, cancelled))
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        self.inner.current_state()
    }

    /// URLs claimed so far
    pub fn visited(&self) -> &VisitedSet {
        &self.inner.visited
    }

    /// Outstanding units of work
    pub fn pending(&self) -> usize {
        self.inner.pending.get()
    }

    /// URLs waiting on the frontier
    pub fn frontier_len(&self) -> usize {
        self.inner.frontier.len()
    }

    /// Live crawl counters
    pub fn stats(&self) -> &CrawlStats {
        &self.inner.stats
    }
}

impl PoolInner {
    fn current_state(&self) -> PoolState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Moves from `from` to `to`, failing if the pool is elsewhere or the move is illegal
    fn transition(&self, from: PoolState, to: PoolState) -> Result<(), ShelobError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != from || !state.can_transition_to(to) {
            return Err(ShelobError::InvalidTransition { from: *state, to });
        }

        tracing::debug!("Worker pool {} -> {}", state, to);
        *state = to;
        Ok(())
    }

    async fn work(&self, id: usize, cancel: CancellationToken) {
        tracing::trace!("Worker {} started", id);

        loop {
            let raw = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = self.frontier.next() => match next {
                    Some(raw) => raw,
                    None => break,
                },
            };

            // Decrements even if processing panics
            let _pending = self.pending.guard();

            tracing::debug!(url = %raw, "begin processing url");
            let outcome = match self.process_url(&raw, &cancel).await {
                Ok(outcome) => {
                    tracing::debug!(url = %raw, outcome = %outcome, "done processing url");
                    outcome
                }
                Err(ShelobError::Cancelled { .. }) => {
                    tracing::debug!(url = %raw, "url abandoned on cancellation");
                    PageOutcome::Failed
                }
                Err(e) => {
                    tracing::error!(url = %raw, error = %e, "error processing url");
                    PageOutcome::Failed
                }
            };

            let processed = self.stats.record(outcome);
            if processed % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress: {} URLs processed, {} visited, {} in frontier",
                    processed,
                    self.visited.len(),
                    self.frontier.len()
                );
            }
        }

        tracing::trace!("Worker {} exiting", id);
    }

    async fn process_url(
        &self,
        raw: &str,
        cancel: &CancellationToken,
    ) -> Result<PageOutcome, ShelobError> {
        let url = Url::parse(raw)?;
        let path = store_path(&self.config.download_path, &url);

        let (content, outcome) = if self.config.resume && self.store.exists(&path).await {
            tracing::debug!(url = %url, path = %path.display(), "url already downloaded");
            (self.store.read(&path).await?, PageOutcome::Resumed)
        } else {
            let content = self.fetcher.fetch(&url, cancel).await?;
            self.store.write(&path, &content).await?;
            (content, PageOutcome::Fetched)
        };

        // Links are read from a lossy decode; the stored bytes stay untouched
        let text = String::from_utf8_lossy(&content);
        let hrefs = self.extractor.extract(&text)?;
        let enqueued = self.enqueue_links(&hrefs);
        self.stats.record_enqueued(enqueued);

        tracing::trace!(url = %url, links = hrefs.len(), enqueued, "links extracted");
        Ok(outcome)
    }

    /// Puts every new in-scope link on the frontier, returning how many were added
    fn enqueue_links(&self, hrefs: &[String]) -> u64 {
        let mut enqueued = 0;

        for href in hrefs {
            let url = match normalize_url(href, &self.config.base_url) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    tracing::trace!(href = %href, reason = %e, "link discarded");
                    continue;
                }
            };

            if !self.visited.try_claim(&url) {
                continue;
            }

            // Counted before it becomes visible so the counter never reads zero early
            self.pending.increment();
            if self.frontier.put(url) {
                enqueued += 1;
            } else {
                // Frontier already closed by cancellation
                self.pending.decrement();
            }
        }

        enqueued
    }

    fn summary(&self, started_at: chrono::DateTime<Utc>, cancelled: bool) -> CrawlSummary {
        CrawlSummary {
            started_at,
            finished_at: Utc::now(),
            fetched: self.stats.fetched(),
            resumed: self.stats.resumed(),
            failed: self.stats.failed(),
            enqueued: self.stats.enqueued(),
            visited: self.visited.len(),
            pending: self.pending.get(),
            unvisited: self.frontier.len(),
            cancelled,
        }
    }
}
