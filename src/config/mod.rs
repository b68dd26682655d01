//! Configuration module for Shelob
//!
//! Settings come from an optional TOML file, environment variables and
//! command line flags. They are merged into a [`RawConfig`] and validated
//! into a [`Config`].
//!
//! # Example
//!
//! ```no_run
//! use shelob::config::{load_config, resolve_config, RawConfig};
//! use std::path::Path;
//!
//! let file = load_config(Path::new("shelob.toml")).unwrap();
//! let config = resolve_config(Some(file), RawConfig::default()).unwrap();
//! println!("Crawling {} with {} workers", config.base_url, config.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FileConfig, LoggingConfig, OutputConfig, RawConfig,
    DEFAULT_DOWNLOAD_PATH, DEFAULT_WORKERS, MAX_WORKERS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, resolve_config};
pub use validation::validate;
