use serde::Deserialize;
use url::Url;

/// Number of workers used when none is configured
pub const DEFAULT_WORKERS: usize = 1;

/// Upper bound accepted for the worker count
pub const MAX_WORKERS: usize = 1024;

/// Download directory used when none is configured
pub const DEFAULT_DOWNLOAD_PATH: &str = "./downloads/";

/// Validated configuration for one crawl
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of parallel workers
    pub workers: usize,

    /// Starting URL; also defines the crawl scope
    pub base_url: Url,

    /// Reuse pages already present in the download directory
    pub resume: bool,

    /// Directory prefix pages are written under, always ending in `/`
    pub download_path: String,

    /// Verbose logging
    pub debug: bool,
}

/// Configuration file layout
///
/// Every setting is optional so command line flags and environment variables
/// can fill in or override any of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerConfig {
    /// Number of parallel workers
    pub workers: Option<usize>,

    /// URL the crawl starts from
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Skip fetching pages already on disk
    pub resume: Option<bool>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory prefix for downloaded pages
    #[serde(rename = "download-path")]
    pub download_path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    pub debug: Option<bool>,
}

/// Unvalidated settings gathered from every configuration source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub workers: Option<usize>,
    pub base_url: Option<String>,
    pub resume: Option<bool>,
    pub download_path: Option<String>,
    pub debug: Option<bool>,
}

impl RawConfig {
    /// Layers `other` on top of `self`; settings present in `other` win
    pub fn overlay(self, other: RawConfig) -> RawConfig {
        RawConfig {
            workers: other.workers.or(self.workers),
            base_url: other.base_url.or(self.base_url),
            resume: other.resume.or(self.resume),
            download_path: other.download_path.or(self.download_path),
            debug: other.debug.or(self.debug),
        }
    }
}

impl From<FileConfig> for RawConfig {
    fn from(file: FileConfig) -> Self {
        RawConfig {
            workers: file.crawler.workers,
            base_url: file.crawler.base_url,
            resume: file.crawler.resume,
            download_path: file.output.download_path,
            debug: file.logging.debug,
        }
    }
}
