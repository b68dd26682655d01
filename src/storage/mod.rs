//! Storage module for persisting crawled pages
//!
//! This module handles writing page content to durable storage and reading it
//! back when a crawl is resumed. The crawler only depends on the
//! `ContentStore` trait; `FileSystemStore` is the implementation used by the
//! binary.

mod filesystem;
mod traits;

pub use filesystem::FileSystemStore;
pub use traits::{ContentStore, StorageError, StorageResult};
