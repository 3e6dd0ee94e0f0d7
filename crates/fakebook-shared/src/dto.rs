//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fakebook_core::domain::{Gender, PostVisibility, ReactionType, ToggleOutcome};
use fakebook_core::views::UserView;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub gender: Gender,
}

/// Admin changes to an account. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub bio: Option<String>,
    pub is_system_admin: Option<bool>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: UserView,
}

/// One entry of the external provider list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub code: i16,
    pub name: String,
}

/// `?before=&limit=` of every cursor listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
}

/// A draft the caller uploaded, attached to a new post by its `path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItemRequest {
    #[serde(default)]
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub visibility: PostVisibility,
    #[serde(default)]
    pub media_items: Vec<MediaItemRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub visibility: Option<PostVisibility>,
}

/// Body of the react endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactRequest {
    #[serde(rename = "type")]
    pub reaction_type: ReactionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactResponse {
    pub outcome: ToggleOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_defaults() {
        let request: CreatePostRequest = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(request.visibility, PostVisibility::Public);
        assert!(request.media_items.is_empty());

        let request: CreatePostRequest = serde_json::from_str(
            r#"{"visibility":"private","media_items":[{"path":"p/uploads/a.png"}]}"#,
        )
        .unwrap();
        assert_eq!(request.visibility, PostVisibility::Private);
        assert_eq!(request.media_items[0].path, "p/uploads/a.png");
        assert_eq!(request.media_items[0].name, "");
        assert_eq!(request.content, "");
    }

    #[test]
    fn test_requests_use_snake_case_keys() {
        let request: CreatePostRequest =
            serde_json::from_str(r#"{"mediaItems":[{"path":"p/uploads/a.png"}]}"#).unwrap();
        assert!(request.media_items.is_empty());

        let update: UpdateUserRequest =
            serde_json::from_str(r#"{"first_name":"Ann","is_system_admin":true}"#).unwrap();
        assert_eq!(update.first_name.as_deref(), Some("Ann"));
        assert_eq!(update.is_system_admin, Some(true));
        assert!(update.email.is_none());
    }

    #[test]
    fn test_react_request_uses_type_key() {
        let request: ReactRequest = serde_json::from_str(r#"{"type":"UpVote"}"#).unwrap();
        assert_eq!(request.reaction_type, ReactionType::UpVote);
        assert!(serde_json::from_str::<ReactRequest>(r#"{"type":"Meh"}"#).is_err());
    }

    #[test]
    fn test_register_gender_defaults_to_unknown() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.c","username":"abc","password":"secret1","first_name":"A","last_name":"B","birth_date":"1990-01-01"}"#,
        )
        .unwrap();
        assert_eq!(request.gender, Gender::Unknown);
    }
}
