//! Crawl statistics
//!
//! Workers record each URL's outcome in a shared [`CrawlStats`]; the pool
//! turns it into a [`CrawlSummary`] once the crawl stops.

use crate::state::PageOutcome;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters updated by workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    fetched: AtomicU64,
    resumed: AtomicU64,
    failed: AtomicU64,
    enqueued: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records how processing of one URL ended, returning the number processed so far
    pub fn record(&self, outcome: PageOutcome) -> u64 {
        let counter = match outcome {
            PageOutcome::Fetched => &self.fetched,
            PageOutcome::Resumed => &self.resumed,
            PageOutcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.processed()
    }

    /// Records newly discovered URLs put on the frontier
    pub fn record_enqueued(&self, count: u64) {
        self.enqueued.fetch_add(count, Ordering::Relaxed);
    }

    pub fn fetched(&self) -> u64 {
        self.fetched.load(Ordering::Relaxed)
    }

    pub fn resumed(&self) -> u64 {
        self.resumed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// URLs whose processing has finished, whatever the outcome
    pub fn processed(&self) -> u64 {
        self.fetched() + self.resumed() + self.failed()
    }
}

/// Snapshot of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Pages fetched over the network
    pub fetched: u64,

    /// Pages loaded from the store in resume mode
    pub resumed: u64,

    /// Pages dropped after a fetch, store or parse error
    pub failed: u64,

    /// Links discovered and put on the frontier (base URL excluded)
    pub enqueued: u64,

    /// Distinct URLs claimed during the crawl
    pub visited: usize,

    /// Pending-work counter when the pool stopped; after cancellation it equals `unvisited`
    pub pending: usize,

    /// URLs still waiting on the frontier when the pool stopped
    pub unvisited: usize,

    /// Whether the crawl stopped because of cancellation
    pub cancelled: bool,
}

impl CrawlSummary {
    /// Wall-clock duration of the crawl
    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Pages processed per second
    pub fn rate(&self) -> f64 {
        let seconds = self.elapsed().as_secs_f64();
        if seconds > 0.0 {
            (self.fetched + self.resumed + self.failed) as f64 / seconds
        } else {
            0.0
        }
    }
}

/// Writes a crawl summary to the log
pub fn log_summary(summary: &CrawlSummary) {
    if summary.cancelled {
        tracing::info!(
            "Crawl interrupted after {:?}: {} URLs left on the frontier",
            summary.elapsed(),
            summary.unvisited
        );
    } else {
        tracing::info!("Crawl completed in {:?}", summary.elapsed());
    }

    tracing::info!(
        "Pages: {} fetched, {} resumed, {} failed ({:.2} pages/sec)",
        summary.fetched,
        summary.resumed,
        summary.failed,
        summary.rate()
    );
    tracing::info!(
        "URLs: {} visited, {} discovered",
        summary.visited,
        summary.enqueued
    );
}
