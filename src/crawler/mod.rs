//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with cancellation
//! - HTML parsing and link extraction
//! - The worker pool driving a whole crawl

mod fetcher;
mod parser;
mod pool;

pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use parser::{extract_links, HtmlLinkExtractor, LinkExtractor};
pub use pool::WorkerPool;

use crate::config::Config;
use crate::output::CrawlSummary;
use crate::storage::FileSystemStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Mirror pages into the configured download directory
/// 3. Extract and follow in-scope links
/// 4. Stop when no work is left or `cancel` fires
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Token that interrupts the crawl
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished or was cancelled
/// * `Err(ShelobError)` - Crawl could not start
pub async fn crawl(config: Config, cancel: CancellationToken) -> crate::Result<CrawlSummary> {
    let fetcher = HttpFetcher::new(config.workers)?;
    let pool = WorkerPool::new(
        config,
        Arc::new(fetcher),
        Arc::new(FileSystemStore::new()),
        Arc::new(HtmlLinkExtractor::new()),
    );

    pool.run(cancel).await
}
