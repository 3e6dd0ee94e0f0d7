use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use crate::domain::FileUpload;
use crate::error::{DomainError, RepoError};
use crate::ports::{FileStorage, FileUploadRepository};
use crate::views::UploadedFileView;

/// Largest accepted upload: 50 MiB.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const ALLOWED_CONTENT_PREFIXES: [&str; 3] = ["image/", "video/", "audio/"];

/// A file received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Directory a stored file lands in, under the uploader's profile directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadArea {
    Uploads,
    Avatars,
}

impl UploadArea {
    fn dir_name(self) -> &'static str {
        match self {
            UploadArea::Uploads => "uploads",
            UploadArea::Avatars => "avatars",
        }
    }
}

/// Stores client files and tracks them as drafts until used.
pub struct UploadService {
    storage: Arc<dyn FileStorage>,
    uploads: Arc<dyn FileUploadRepository>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn FileStorage>, uploads: Arc<dyn FileUploadRepository>) -> Self {
        Self { storage, uploads }
    }

    pub fn validate(file: &IncomingFile) -> Result<(), DomainError> {
        if file.bytes.is_empty() {
            return Err(DomainError::validation("File is empty"));
        }
        if file.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(DomainError::validation("File exceeds the 50 MB limit"));
        }
        let content_type = file.content_type.trim().to_ascii_lowercase();
        if !ALLOWED_CONTENT_PREFIXES
            .iter()
            .any(|prefix| content_type.starts_with(prefix))
        {
            return Err(DomainError::validation(format!(
                "Unsupported content type: {}",
                file.content_type
            )));
        }
        Ok(())
    }

    /// Store a file at `{profile_id}/{area}/{uuid}{ext}` and record it as a draft.
    pub async fn upload(
        &self,
        uploader: Uuid,
        file: IncomingFile,
        area: UploadArea,
    ) -> Result<UploadedFileView, DomainError> {
        Self::validate(&file)?;

        let stored_name = format!("{}{}", Uuid::new_v4(), extension_of(&file.file_name));
        let directory = format!("{uploader}/{}", area.dir_name());
        let path = self
            .storage
            .upload(&file.bytes, &stored_name, &directory)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let record = FileUpload::draft(
            file.file_name,
            path,
            file.content_type,
            file.bytes.len() as i64,
            uploader,
        );
        let record = self.uploads.insert(record).await?;

        tracing::info!(%uploader, path = %record.path, size = record.size, "File uploaded");

        Ok(UploadedFileView {
            url: self.storage.url(&record.path),
            name: record.name,
            path: record.path,
            size: record.size,
            content_type: record.content_type,
        })
    }

    pub fn url(&self, path: &str) -> String {
        self.storage.url(path)
    }

    /// Delete a stored file. Failures are logged and reported as `false`.
    pub async fn delete_file(&self, path: &str) -> bool {
        match self.storage.delete(path).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to delete stored file");
                false
            }
        }
    }

    /// Promote the drafts of `uploader` stored at `paths`.
    pub async fn mark_used(&self, uploader: Uuid, paths: &[String]) -> Result<u64, DomainError> {
        if paths.is_empty() {
            return Ok(0);
        }
        Ok(self.uploads.mark_used(uploader, paths).await?)
    }

    /// The drafts of `uploader` stored at `paths`, keyed by path.
    ///
    /// Every path must name a draft the same profile uploaded. Files of other
    /// profiles and files already attached somewhere are rejected.
    pub async fn drafts_of(
        &self,
        uploader: Uuid,
        paths: &[String],
    ) -> Result<HashMap<String, FileUpload>, DomainError> {
        if paths.is_empty() {
            return Ok(HashMap::new());
        }

        let found: HashMap<String, FileUpload> = self
            .uploads
            .find_by_paths(paths)
            .await?
            .into_iter()
            .filter(|u| u.uploaded_by == uploader && u.is_draft)
            .map(|u| (u.path.clone(), u))
            .collect();

        if let Some(missing) = paths.iter().find(|p| !found.contains_key(*p)) {
            tracing::warn!(%uploader, path = %missing, "Rejected media path");
            return Err(DomainError::validation(format!(
                "No pending upload of yours at {missing}"
            )));
        }
        Ok(found)
    }

    /// Remove drafts older than `retention` from storage and from the table.
    pub async fn cleanup_drafts(&self, retention: TimeDelta) -> Result<usize, DomainError> {
        let cutoff = Utc::now() - retention;
        let drafts = self.uploads.find_drafts_before(cutoff).await?;

        for draft in &drafts {
            self.delete_file(&draft.path).await;
            match self.uploads.delete(draft.id).await {
                Ok(()) | Err(RepoError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if !drafts.is_empty() {
            tracing::info!(count = drafts.len(), %cutoff, "Draft uploads cleaned up");
        }
        Ok(drafts.len())
    }
}

/// Lowercased extension with its dot, or empty.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, len: usize) -> IncomingFile {
        IncomingFile {
            file_name: "cat.PNG".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn test_validate_accepts_media_types() {
        assert!(UploadService::validate(&file("image/png", 10)).is_ok());
        assert!(UploadService::validate(&file("video/mp4", 10)).is_ok());
        assert!(UploadService::validate(&file("audio/mpeg", 10)).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_files() {
        assert!(UploadService::validate(&file("image/png", 0)).is_err());
        assert!(UploadService::validate(&file("application/pdf", 10)).is_err());
        assert!(UploadService::validate(&file("image/png", MAX_UPLOAD_BYTES + 1)).is_err());
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(extension_of("cat.PNG"), ".png");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
    }
}
