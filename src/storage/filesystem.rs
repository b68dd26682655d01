use crate::storage::traits::{ContentStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::Path;

/// Content store that mirrors pages into a directory tree
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemStore;

impl FileSystemStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentStore for FileSystemStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    async fn read(&self, path: &Path) -> StorageResult<Bytes> {
        let content = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::NotFound(path.to_path_buf())
            } else {
                StorageError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        Ok(Bytes::from(content))
    }

    async fn write(&self, path: &Path, content: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| StorageError::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }
}
