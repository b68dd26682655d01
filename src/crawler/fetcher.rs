//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building an HTTP client with browser-like request headers
//! - GET requests returning the raw response body
//! - Treating every non-success status as an error
//! - Aborting in-flight requests on cancellation

use crate::ShelobError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Retrieves page content for a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, giving up as soon as `cancel` fires
    async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<Bytes, ShelobError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `workers` - Number of crawl workers; sizes the idle connection pool
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use shelob::crawler::build_http_client;
///
/// let client = build_http_client(4).unwrap();
/// ```
pub fn build_http_client(workers: usize) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_max_idle_per_host(workers)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client sized for `workers` parallel requests
    pub fn new(workers: usize) -> Result<Self, ShelobError> {
        Ok(Self {
            client: build_http_client(workers)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &Url) -> Result<Bytes, ShelobError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ShelobError::Http {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShelobError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| ShelobError::Http {
            url: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<Bytes, ShelobError> {
        // Dropping the request future aborts the request
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ShelobError::Cancelled {
                url: url.to_string(),
            }),
            result = self.get(url) => result,
        }
    }
}
