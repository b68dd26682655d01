//! Shelob: a concurrent site mirroring crawler
//!
//! This crate crawls a website from a base URL, stores every fetched page on
//! disk and follows in-scope links until the whole site has been visited or the
//! crawl is cancelled.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Shelob operations
#[derive(Debug, Error)]
pub enum ShelobError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid base URL {url}: {source}")]
    InvalidBaseUrl { url: String, source: UrlError },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status code {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request for {url} cancelled")]
    Cancelled { url: String },

    #[error("HTML parse error: {message}")]
    HtmlParse { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid pool state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PoolState,
        to: state::PoolState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Reasons a discovered link is rejected by normalization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Protocol-relative URL: {0}")]
    ProtocolRelative(String),

    #[error("Mail link: {0}")]
    Mailto(String),

    #[error("URL contains '..': {0}")]
    PathTraversal(String),

    #[error("URL outside of crawl scope: {0}")]
    OutOfScope(String),
}

/// Result type alias for Shelob operations
pub type Result<T> = std::result::Result<T, ShelobError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::WorkerPool;
pub use frontier::Frontier;
pub use state::{PendingCounter, PoolState, VisitedSet};
pub use crate::url::{normalize_url, store_path};
