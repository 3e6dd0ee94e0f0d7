use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AccessToken, ExternalProvider, FileUpload, Post, PostComment, PostMedia, Profile, Reaction,
    ReactionTarget, ReactionType, User, UserExternal,
};
use crate::error::RepoError;
use crate::pagination::PageRequest;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// All accounts, oldest first.
    async fn list_all(&self) -> Result<Vec<User>, RepoError>;
}

/// Persisted JWT sessions (the denylist source of truth).
#[async_trait]
pub trait TokenRepository: BaseRepository<AccessToken, Uuid> {
    /// Remove sessions that expired at or before `now`. Returns the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError>;
}

/// External provider links.
#[async_trait]
pub trait UserExternalRepository: BaseRepository<UserExternal, Uuid> {
    async fn find_link(
        &self,
        user_id: Uuid,
        provider: ExternalProvider,
    ) -> Result<Option<UserExternal>, RepoError>;
}

/// Profile repository.
#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, Uuid> {
    /// Profiles owned by an account, oldest first.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Profile>, RepoError>;

    /// Batch lookup by profile id. Missing ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Profile>, RepoError>;
}

/// Which posts a feed query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    /// Public posts from everyone plus every post by `viewer`.
    Timeline { viewer: Uuid },
    /// Posts written by one profile.
    Author {
        profile_id: Uuid,
        include_private: bool,
    },
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Newest-first page of posts matching `filter`, created strictly before the cursor.
    async fn list(&self, filter: FeedFilter, page: PageRequest) -> Result<Vec<Post>, RepoError>;

    /// Insert a post together with its media rows and clear the draft flag on
    /// the author's uploads stored at the media paths, atomically.
    async fn create_with_media(&self, post: Post, media: Vec<PostMedia>)
    -> Result<Post, RepoError>;

    /// Delete a post with its media, comments and every reaction on the post
    /// or its comments, atomically. Returns the removed media rows.
    async fn delete_with_dependents(&self, id: Uuid) -> Result<Vec<PostMedia>, RepoError>;
}

/// Post media repository.
#[async_trait]
pub trait PostMediaRepository: Send + Sync {
    /// Media of many posts in one query.
    async fn find_by_posts(&self, post_ids: &[Uuid]) -> Result<Vec<PostMedia>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait PostCommentRepository: BaseRepository<PostComment, Uuid> {
    /// Newest-first page of comments on a post.
    async fn list_for_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<PostComment>, RepoError>;

    /// Comment counts for many posts. Posts without comments are absent.
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;

    /// Delete a comment and the reactions on it, atomically.
    async fn delete_with_reactions(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Grouped reaction count row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionCount {
    pub target_id: Uuid,
    pub reaction_type: ReactionType,
    pub count: u64,
}

/// Reaction repository.
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// The reaction a profile left on one target, if any.
    async fn find_by_profile(
        &self,
        profile_id: Uuid,
        target: ReactionTarget,
        target_id: Uuid,
    ) -> Result<Option<Reaction>, RepoError>;

    /// The reactions a profile left on many targets of one kind.
    async fn find_many_by_profile(
        &self,
        profile_id: Uuid,
        target: ReactionTarget,
        target_ids: &[Uuid],
    ) -> Result<Vec<Reaction>, RepoError>;

    /// Insert a reaction. Violating the one-per-profile-per-target rule is a `Constraint` error.
    async fn insert(&self, reaction: Reaction) -> Result<Reaction, RepoError>;

    /// Change the type of an existing reaction.
    async fn update_type(&self, id: Uuid, reaction_type: ReactionType) -> Result<(), RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Counts grouped by (target, reaction type) for many targets of one kind.
    async fn count_by_targets(
        &self,
        target: ReactionTarget,
        target_ids: &[Uuid],
    ) -> Result<Vec<ReactionCount>, RepoError>;
}

/// Upload bookkeeping.
#[async_trait]
pub trait FileUploadRepository: BaseRepository<FileUpload, Uuid> {
    /// Uploads stored at any of `paths`.
    async fn find_by_paths(&self, paths: &[String]) -> Result<Vec<FileUpload>, RepoError>;

    /// Clear the draft flag on uploads of `uploader` stored at any of `paths`.
    async fn mark_used(&self, uploader: Uuid, paths: &[String]) -> Result<u64, RepoError>;

    /// Drafts created strictly before `cutoff`.
    async fn find_drafts_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<FileUpload>, RepoError>;
}
