//! File storage port.

use async_trait::async_trait;

/// Backend that holds uploaded bytes and hands out public URLs.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `bytes` as `file_name` under `directory`. Returns the relative path.
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        directory: &str,
    ) -> Result<String, StorageError>;

    /// Delete a stored file. Returns `false` when nothing was there.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;

    /// Public URL of a stored path.
    fn url(&self, path: &str) -> String;
}

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(String),
}
