use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of a stored file. New uploads are drafts until something uses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUpload {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_by: Uuid,
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
}

impl FileUpload {
    pub fn draft(name: String, path: String, content_type: String, size: i64, uploaded_by: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            path,
            content_type,
            size,
            uploaded_by,
            is_draft: true,
            created_at: Utc::now(),
        }
    }
}
