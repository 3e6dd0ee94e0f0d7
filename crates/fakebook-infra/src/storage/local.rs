//! Local filesystem storage.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use fakebook_core::ports::{FileStorage, StorageError};

/// Where files live on disk and how their public URLs are built.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory on disk.
    pub dir_path: PathBuf,
    /// Public origin, e.g. `https://cdn.example.com`.
    pub base_url: String,
    /// Path prefix under the origin, e.g. `files`.
    pub base_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir_path: PathBuf::from("./storage"),
            base_url: "http://127.0.0.1:8080".to_string(),
            base_path: "files".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            dir_path: std::env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.dir_path),
            base_url: std::env::var("STORAGE_BASE_URL").unwrap_or(defaults.base_url),
            base_path: std::env::var("STORAGE_BASE_PATH").unwrap_or(defaults.base_path),
        }
    }
}

/// Stores files under a root directory with `tokio::fs`.
pub struct LocalFileStorage {
    config: StorageConfig,
}

impl LocalFileStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Turn a relative storage path into a path under the root. Rejects escapes.
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let relative = normalize(relative);
        if relative.is_empty() {
            return Err(StorageError::InvalidPath("empty path".to_string()));
        }

        let path = Path::new(&relative);
        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(relative));
        }

        Ok(self.config.dir_path.join(path))
    }
}

/// Forward slashes, no leading or trailing separators.
fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_matches('/').to_string()
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn upload(
        &self,
        bytes: &[u8],
        file_name: &str,
        directory: &str,
    ) -> Result<String, StorageError> {
        let relative = format!("{}/{}", normalize(directory), normalize(file_name));
        let target = self.resolve(&relative)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(path = %relative, bytes = bytes.len(), "File stored");
        Ok(normalize(&relative))
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.base_path.trim_matches('/'),
            normalize(path)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: PathBuf) -> LocalFileStorage {
        LocalFileStorage::new(StorageConfig {
            dir_path: dir,
            base_url: "https://cdn.example.com/".to_string(),
            base_path: "/files/".to_string(),
        })
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("fakebook-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_url_joins_trimmed_parts() {
        let storage = storage(scratch_dir());

        assert_eq!(
            storage.url("/abc\\uploads\\x.png"),
            "https://cdn.example.com/files/abc/uploads/x.png"
        );
    }

    #[tokio::test]
    async fn test_upload_then_delete() {
        let dir = scratch_dir();
        let storage = storage(dir.clone());

        let path = storage
            .upload(b"hello", "x.txt", "profile/uploads")
            .await
            .unwrap();
        assert_eq!(path, "profile/uploads/x.txt");
        assert_eq!(
            tokio::fs::read(dir.join("profile/uploads/x.txt")).await.unwrap(),
            b"hello"
        );

        assert!(storage.delete(&path).await.unwrap());
        assert!(!storage.delete(&path).await.unwrap());

        let _ = tokio::fs::remove_dir_all(dir).await;
    }

    #[tokio::test]
    async fn test_rejects_parent_traversal() {
        let storage = storage(scratch_dir());

        let result = storage.upload(b"x", "passwd", "../../etc").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }
}
