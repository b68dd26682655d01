//! Integration tests for the crawler
//!
//! Most tests drive the worker pool with in-memory collaborators so fetches
//! and writes can be counted exactly. The last ones use wiremock to run the
//! full crawl cycle end-to-end against a mock HTTP server.

use async_trait::async_trait;
use bytes::Bytes;
use shelob::config::Config;
use shelob::crawler::{crawl, Fetcher, HtmlLinkExtractor, HttpFetcher, LinkExtractor, WorkerPool};
use shelob::state::{PendingCounter, PoolState, VisitedSet};
use shelob::storage::{ContentStore, FileSystemStore, StorageError, StorageResult};
use shelob::{store_path, Frontier, ShelobError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "http://site.test";

/// Serves fixed pages and counts every request
#[derive(Default)]
struct CountingFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl CountingFetcher {
    fn with_pages(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &Url, _cancel: &CancellationToken) -> Result<Bytes, ShelobError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .map(|body| Bytes::from(body.clone()))
            .ok_or_else(|| ShelobError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Generates an endless site: every page links to two pages never seen before
#[derive(Default)]
struct EndlessFetcher {
    next_page: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl Fetcher for EndlessFetcher {
    async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<Bytes, ShelobError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ShelobError::Cancelled { url: url.to_string() }),
            _ = tokio::time::sleep(Duration::from_millis(5)) => {
                let n = self.next_page.fetch_add(2, Ordering::SeqCst);
                Ok(Bytes::from(format!("/p{} /p{}", n, n + 1)))
            }
        }
    }
}

/// Content store kept in memory that counts writes
#[derive(Default)]
struct MemoryStore {
    files: Mutex<HashMap<PathBuf, Bytes>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    fn insert(&self, path: PathBuf, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path, Bytes::copy_from_slice(content.as_bytes()));
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    async fn read(&self, path: &Path) -> StorageResult<Bytes> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }

    async fn write(&self, path: &Path, content: &[u8]) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Bytes::copy_from_slice(content));
        Ok(())
    }
}

/// Treats content as whitespace-separated hrefs
struct WordExtractor;

impl LinkExtractor for WordExtractor {
    fn extract(&self, content: &str) -> Result<Vec<String>, ShelobError> {
        Ok(content.split_whitespace().map(str::to_string).collect())
    }
}

/// Creates a test configuration rooted at `base_url`
fn create_test_config(base_url: &str, workers: usize, resume: bool) -> Config {
    Config {
        workers,
        base_url: Url::parse(base_url).unwrap(),
        resume,
        download_path: "/mirror/".to_string(),
        debug: false,
    }
}

fn page_path(url: &str) -> PathBuf {
    store_path("/mirror/", &Url::parse(url).unwrap())
}

#[tokio::test]
async fn test_single_page_crawl() {
    let fetcher = Arc::new(CountingFetcher::with_pages(&[(
        "http://site.test/",
        "<html>no links</html>",
    )]));
    let store = Arc::new(MemoryStore::default());
    let pending = PendingCounter::new();

    let pool = WorkerPool::with_state(
        create_test_config(BASE, 1, false),
        Frontier::new(),
        VisitedSet::new(),
        pending.clone(),
        fetcher.clone(),
        store.clone(),
        Arc::new(WordExtractor),
    );

    let summary = pool.run(CancellationToken::new()).await.unwrap();

    assert_eq!(fetcher.requests(), vec!["http://site.test/"]);
    assert_eq!(store.writes(), 1);
    assert_eq!(pending.get(), 0);
    assert_eq!(summary.visited, 1);
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn test_two_pages_with_duplicate_link() {
    let fetcher = Arc::new(CountingFetcher::with_pages(&[
        ("http://site.test/", "/page1 /page1"),
        ("http://site.test/page1", ""),
    ]));
    let store = Arc::new(MemoryStore::default());
    let visited = VisitedSet::new();
    let pending = PendingCounter::new();

    let pool = WorkerPool::with_state(
        create_test_config(BASE, 2, true),
        Frontier::new(),
        visited.clone(),
        pending.clone(),
        fetcher.clone(),
        store.clone(),
        Arc::new(WordExtractor),
    );

    pool.run(CancellationToken::new()).await.unwrap();

    assert_eq!(fetcher.requests().len(), 2);
    assert_eq!(store.writes(), 2);
    assert_eq!(pending.get(), 0);
    assert_eq!(visited.len(), 2);
    assert!(store.exists(&page_path("http://site.test/page1")).await);
}

#[tokio::test]
async fn test_resume_hit_skips_fetch() {
    let fetcher = Arc::new(CountingFetcher::with_pages(&[("http://site.test/a", "")]));
    let store = Arc::new(MemoryStore::default());
    store.insert(page_path("http://site.test/"), "/a");

    let pool = WorkerPool::new(
        create_test_config(BASE, 1, true),
        fetcher.clone(),
        store.clone(),
        Arc::new(WordExtractor),
    );

    let summary = pool.run(CancellationToken::new()).await.unwrap();

    // Links in the stored copy are still followed
    assert_eq!(fetcher.requests(), vec!["http://site.test/a"]);
    assert_eq!(summary.resumed, 1);
    assert_eq!(summary.fetched, 1);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_without_resume_always_fetches() {
    let fetcher = Arc::new(CountingFetcher::with_pages(&[("http://site.test/", "fresh")]));
    let store = Arc::new(MemoryStore::default());
    store.insert(page_path("http://site.test/"), "stale");

    let pool = WorkerPool::new(
        create_test_config(BASE, 1, false),
        fetcher.clone(),
        store.clone(),
        Arc::new(WordExtractor),
    );

    let summary = pool.run(CancellationToken::new()).await.unwrap();

    assert_eq!(fetcher.requests().len(), 1);
    assert_eq!(summary.resumed, 0);
    assert_eq!(
        store.read(&page_path("http://site.test/")).await.unwrap(),
        &b"fresh"[..]
    );
}

#[tokio::test]
async fn test_many_workers_fetch_each_url_once() {
    // Every page links to every other page
    let urls: Vec<String> = (0..40).map(|i| format!("http://site.test/p{}", i)).collect();
    let body: String = (0..40).map(|i| format!("/p{} ", i)).collect();
    let mut pages: Vec<(&str, &str)> = urls.iter().map(|u| (u.as_str(), body.as_str())).collect();
    pages.push(("http://site.test/", body.as_str()));

    let fetcher = Arc::new(CountingFetcher::with_pages(&pages));
    let pool = WorkerPool::new(
        create_test_config(BASE, 8, false),
        fetcher.clone(),
        Arc::new(MemoryStore::default()),
        Arc::new(WordExtractor),
    );

    let summary = tokio::time::timeout(Duration::from_secs(10), pool.run(CancellationToken::new()))
        .await
        .expect("crawl did not terminate")
        .unwrap();

    let mut requests = fetcher.requests();
    requests.sort();
    requests.dedup();
    assert_eq!(requests.len(), 41);
    assert_eq!(fetcher.requests().len(), 41);
    assert_eq!(summary.fetched, 41);
    assert_eq!(summary.enqueued, 40);
    assert_eq!(pool.pending(), 0);
}

#[tokio::test]
async fn test_out_of_scope_links_not_followed() {
    let fetcher = Arc::new(CountingFetcher::with_pages(&[
        ("http://site.test/docs", "/docs/a /blog http://other.test/docs //cdn.test/x mailto:a@b.c /docs/../secret"),
        ("http://site.test/docs/a", ""),
    ]));

    let pool = WorkerPool::new(
        create_test_config("http://site.test/docs", 2, false),
        fetcher.clone(),
        Arc::new(MemoryStore::default()),
        Arc::new(WordExtractor),
    );

    pool.run(CancellationToken::new()).await.unwrap();

    let mut requests = fetcher.requests();
    requests.sort();
    assert_eq!(
        requests,
        vec!["http://site.test/docs", "http://site.test/docs/a"]
    );
}

#[tokio::test]
async fn test_failed_page_is_dropped() {
    let fetcher = Arc::new(CountingFetcher::with_pages(&[
        ("http://site.test/", "/gone /ok"),
        ("http://site.test/ok", ""),
    ]));

    let pool = WorkerPool::new(
        create_test_config(BASE, 2, false),
        fetcher.clone(),
        Arc::new(MemoryStore::default()),
        Arc::new(WordExtractor),
    );

    let summary = pool.run(CancellationToken::new()).await.unwrap();

    // No retry for the missing page
    assert_eq!(fetcher.requests().len(), 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.pending, 0);
}

#[tokio::test]
async fn test_cancellation_mid_crawl() {
    const WORKERS: usize = 4;

    let fetcher = Arc::new(EndlessFetcher::default());
    let pool = WorkerPool::new(
        create_test_config(BASE, WORKERS, false),
        fetcher.clone(),
        Arc::new(MemoryStore::default()),
        Arc::new(WordExtractor),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let counter = fetcher.clone();
    let calls_at_cancel = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
        counter.calls.load(Ordering::SeqCst)
    });

    let observer = pool.clone();
    let summary = tokio::time::timeout(Duration::from_secs(5), pool.run(cancel))
        .await
        .expect("workers did not stop after cancellation")
        .unwrap();
    let calls_at_cancel = calls_at_cancel.await.unwrap();
    let calls = fetcher.calls.load(Ordering::SeqCst);

    assert!(summary.cancelled);
    assert!(summary.fetched > 0);
    assert_eq!(observer.state(), PoolState::Stopped);

    // Only items already dequeued when the token fired may reach the fetcher
    assert!(
        calls <= calls_at_cancel + WORKERS,
        "{} fetches after cancellation with {} workers",
        calls - calls_at_cancel,
        WORKERS
    );

    // Every URL accepted by the frontier was either processed or is still queued
    let processed = summary.fetched + summary.failed;
    assert_eq!(processed as usize, calls);
    assert_eq!(
        summary.unvisited as u64,
        summary.enqueued + 1 - processed
    );
    assert_eq!(observer.frontier_len(), summary.unvisited);
    assert_eq!(summary.pending, summary.unvisited);
    assert!(summary.unvisited > 0);
}

#[tokio::test]
async fn test_full_crawl_against_mock_server() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="/page1">Page 1</a>
                <a href="/page1#again">Page 1 again</a>
                <a href="https://elsewhere.test/">Elsewhere</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><body><a href="/">Home</a></body></html>"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let download_path = format!("{}/", temp_dir.path().display());

    let config = Config {
        workers: 2,
        base_url: Url::parse(&base_url).unwrap(),
        resume: false,
        download_path: download_path.clone(),
        debug: false,
    };

    let summary = crawl(config, CancellationToken::new()).await.unwrap();

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.pending, 0);

    let index = store_path(&download_path, &Url::parse(&base_url).unwrap());
    let page1 = store_path(
        &download_path,
        &Url::parse(&format!("{}/page1", base_url)).unwrap(),
    );
    assert!(index.ends_with("index.html"));
    assert!(tokio::fs::read_to_string(&index)
        .await
        .unwrap()
        .contains("/page1"));
    assert!(tokio::fs::read_to_string(&page1)
        .await
        .unwrap()
        .contains("Home"));
}

#[tokio::test]
async fn test_resume_against_mock_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Nothing may be requested: the only page is already on disk
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let download_path = format!("{}/", temp_dir.path().display());
    let index = store_path(&download_path, &Url::parse(&base_url).unwrap());
    FileSystemStore::new()
        .write(&index, b"<html>cached</html>")
        .await
        .unwrap();

    let config = Config {
        workers: 1,
        base_url: Url::parse(&base_url).unwrap(),
        resume: true,
        download_path,
        debug: false,
    };

    let pool = WorkerPool::new(
        config,
        Arc::new(HttpFetcher::new(1).unwrap()),
        Arc::new(FileSystemStore::new()),
        Arc::new(HtmlLinkExtractor::new()),
    );

    let summary = pool.run(CancellationToken::new()).await.unwrap();

    assert_eq!(summary.resumed, 1);
    assert_eq!(summary.fetched, 0);
}

#[tokio::test]
async fn test_binary_page_round_trips_through_resume() {
    let png = vec![137u8, 80, 78, 71, 13, 10, 26, 10, 255, 254, 0, 128];
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><body><img src="x"><a href="/img.png">Logo</a></body></html>"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png.clone(), "image/png"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let download_path = format!("{}/", temp_dir.path().display());
    let config = Config {
        workers: 2,
        base_url: Url::parse(&base_url).unwrap(),
        resume: false,
        download_path: download_path.clone(),
        debug: false,
    };

    let summary = crawl(config.clone(), CancellationToken::new()).await.unwrap();
    assert_eq!(summary.fetched, 2);

    let image = store_path(
        &download_path,
        &Url::parse(&format!("{}/img.png", base_url)).unwrap(),
    );
    assert!(image.ends_with("img.png"));
    assert_eq!(tokio::fs::read(&image).await.unwrap(), png);

    // Second run serves everything from disk
    mock_server.verify().await;
    mock_server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let resumed = crawl(
        Config {
            resume: true,
            ..config
        },
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(resumed.resumed, 2);
    assert_eq!(resumed.failed, 0);
    assert_eq!(tokio::fs::read(&image).await.unwrap(), png);
}
