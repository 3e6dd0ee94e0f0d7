//! Read models returned to clients. Feed items are denormalized: each one
//! carries its creator, media, counters and the viewer's own reaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Gender, PostVisibility, ReactionType, User};
use crate::ports::ReactionCount;

/// Name shown when a creator profile no longer exists.
pub const UNKNOWN_CREATOR: &str = "Unknown user";

/// Reaction counters for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSummary {
    pub upvote: u64,
    pub downvote: u64,
    pub total: u64,
}

impl ReactionSummary {
    pub fn add(&mut self, reaction_type: ReactionType, count: u64) {
        match reaction_type {
            ReactionType::UpVote => self.upvote += count,
            ReactionType::DownVote => self.downvote += count,
            _ => {}
        }
        self.total += count;
    }

    /// Fold grouped count rows into per-target summaries.
    pub fn fold(rows: &[ReactionCount]) -> std::collections::HashMap<Uuid, ReactionSummary> {
        let mut out = std::collections::HashMap::new();
        for row in rows {
            out.entry(row.target_id)
                .or_insert_with(ReactionSummary::default)
                .add(row.reaction_type, row.count);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorView {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItemView {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub source: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatistic {
    pub comment: u64,
    pub share: u64,
    pub reactions: ReactionSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentStatistic {
    pub reactions: ReactionSummary,
    pub replies: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub content: String,
    pub visibility: PostVisibility,
    pub media_items: Vec<MediaItemView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: CreatorView,
    pub statistic: PostStatistic,
    pub reaction: Option<ReactionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: CreatorView,
    pub statistic: CommentStatistic,
    pub reaction: Option<ReactionType>,
}

/// Result of a stored upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFileView {
    pub name: String,
    pub path: String,
    pub size: i64,
    pub content_type: String,
    pub url: String,
}

/// Public account information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub bio: Option<String>,
    pub avatar: String,
    pub joined_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        let avatar = user
            .avatar
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| user.gender.default_avatar().to_string());

        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            gender: user.gender,
            birth_date: user.birth_date,
            bio: user.bio.clone(),
            avatar,
            joined_at: user.joined_at,
        }
    }
}
