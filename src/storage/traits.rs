//! Storage traits and error types
//!
//! This module defines the trait interface for content store backends and
//! associated error types.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No content stored at {0}")]
    NotFound(PathBuf),

    #[error("Failed to create directories for {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for content store implementations
///
/// Pages are addressed by the path derived from their URL and stored as raw
/// bytes, exactly as served. Each URL maps to a
/// distinct path, so implementations never see concurrent writes to the same
/// location during a crawl.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Returns whether content is stored at `path`
    async fn exists(&self, path: &Path) -> bool;

    /// Reads the content stored at `path`
    async fn read(&self, path: &Path) -> StorageResult<Bytes>;

    /// Stores `content` at `path`, creating missing parent directories
    async fn write(&self, path: &Path, content: &[u8]) -> StorageResult<()>;
}
