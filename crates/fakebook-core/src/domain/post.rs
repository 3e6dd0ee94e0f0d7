use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who can see a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostVisibility {
    #[default]
    Public,
    Private,
}

impl PostVisibility {
    pub fn code(self) -> i16 {
        match self {
            PostVisibility::Public => 0,
            PostVisibility::Private => 1,
        }
    }

    /// Unknown codes are treated as private.
    pub fn from_code(code: i16) -> Self {
        match code {
            0 => PostVisibility::Public,
            _ => PostVisibility::Private,
        }
    }
}

/// Post entity - a status update written by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    pub created_by: Uuid,
    pub visibility: PostVisibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(created_by: Uuid, content: String, visibility: PostVisibility) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content,
            created_by,
            visibility,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `viewer` (a profile id, if any) may see this post.
    pub fn is_visible_to(&self, viewer: Option<Uuid>) -> bool {
        match self.visibility {
            PostVisibility::Public => true,
            PostVisibility::Private => viewer == Some(self.created_by),
        }
    }
}

/// Kind of media attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Unknown,
    Image,
    Video,
    Audio,
    File,
}

impl MediaType {
    /// Classify by MIME content type prefix.
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.starts_with("image/") {
            MediaType::Image
        } else if content_type.starts_with("video/") {
            MediaType::Video
        } else if content_type.starts_with("audio/") {
            MediaType::Audio
        } else {
            MediaType::Unknown
        }
    }

    pub fn code(self) -> i16 {
        match self {
            MediaType::Unknown => 0,
            MediaType::Image => 1,
            MediaType::Video => 2,
            MediaType::Audio => 3,
            MediaType::File => 4,
        }
    }

    pub fn from_code(code: i16) -> Self {
        match code {
            1 => MediaType::Image,
            2 => MediaType::Video,
            3 => MediaType::Audio,
            4 => MediaType::File,
            _ => MediaType::Unknown,
        }
    }

    /// Name used in feed payloads. Generic files render as `unknown`.
    pub fn wire_name(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Unknown | MediaType::File => "unknown",
        }
    }
}

/// A file attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMedia {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub media_type: MediaType,
    pub content_type: String,
    pub path: String,
    pub size: f64,
}

impl PostMedia {
    pub fn new(post_id: Uuid, name: String, content_type: String, path: String, size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            name,
            media_type: MediaType::from_content_type(&content_type),
            content_type,
            path,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_content_type() {
        assert_eq!(MediaType::from_content_type("image/png"), MediaType::Image);
        assert_eq!(MediaType::from_content_type("video/mp4"), MediaType::Video);
        assert_eq!(MediaType::from_content_type("Audio/MPEG"), MediaType::Audio);
        assert_eq!(
            MediaType::from_content_type("application/pdf"),
            MediaType::Unknown
        );
        assert_eq!(MediaType::File.wire_name(), "unknown");
    }

    #[test]
    fn test_private_post_only_visible_to_author() {
        let author = Uuid::new_v4();
        let post = Post::new(author, "secret".to_string(), PostVisibility::Private);

        assert!(post.is_visible_to(Some(author)));
        assert!(!post.is_visible_to(Some(Uuid::new_v4())));
        assert!(!post.is_visible_to(None));
    }

    #[test]
    fn test_visibility_codes() {
        for v in [PostVisibility::Public, PostVisibility::Private] {
            assert_eq!(PostVisibility::from_code(v.code()), v);
        }
        assert_eq!(PostVisibility::from_code(42), PostVisibility::Private);
    }
}
