use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Post, PostMedia, PostVisibility, ReactionTarget, ReactionType, ToggleOutcome};
use crate::error::DomainError;
use crate::pagination::{CursorPage, PageRequest};
use crate::ports::{FeedFilter, PostCommentRepository, PostRepository};
use crate::services::{FeedAssembler, ReactionService, UploadService};
use crate::views::{PostStatistic, PostView};

/// Media attached to a new post, pointing at a draft the author uploaded.
///
/// Content type and size come from the upload record. A blank `name` falls
/// back to the uploaded file name.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub visibility: PostVisibility,
    pub media: Vec<NewMedia>,
}

#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub content: Option<String>,
    pub visibility: Option<PostVisibility>,
}

/// Posts and the feeds built from them.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn PostCommentRepository>,
    reactions: Arc<ReactionService>,
    feed: Arc<FeedAssembler>,
    uploads: Arc<UploadService>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn PostCommentRepository>,
        reactions: Arc<ReactionService>,
        feed: Arc<FeedAssembler>,
        uploads: Arc<UploadService>,
    ) -> Self {
        Self {
            posts,
            comments,
            reactions,
            feed,
            uploads,
        }
    }

    /// Public posts from everyone plus every post of `viewer`, newest first.
    pub async fn timeline(
        &self,
        viewer: Uuid,
        page: PageRequest,
    ) -> Result<CursorPage<PostView>, DomainError> {
        self.list(FeedFilter::Timeline { viewer }, page, Some(viewer))
            .await
    }

    /// Posts written by `profile_id`. Private ones only when the viewer is that profile.
    pub async fn profile_feed(
        &self,
        profile_id: Uuid,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<CursorPage<PostView>, DomainError> {
        let filter = FeedFilter::Author {
            profile_id,
            include_private: viewer == Some(profile_id),
        };
        self.list(filter, page, viewer).await
    }

    async fn list(
        &self,
        filter: FeedFilter,
        page: PageRequest,
        viewer: Option<Uuid>,
    ) -> Result<CursorPage<PostView>, DomainError> {
        let posts = self.posts.list(filter, page).await?;
        let page = CursorPage::from_items(posts, |p| p.created_at);
        let views = self.feed.posts(&page.items, viewer).await?;
        Ok(page.with_items(views))
    }

    pub async fn get(&self, id: Uuid, viewer: Option<Uuid>) -> Result<PostView, DomainError> {
        let post = self.find_visible(id, viewer).await?;
        self.view(post, viewer).await
    }

    pub async fn create(&self, author: Uuid, new: NewPost) -> Result<PostView, DomainError> {
        let content = new.content.trim().to_string();
        if content.is_empty() && new.media.is_empty() {
            return Err(DomainError::validation(
                "A post needs content or at least one media item",
            ));
        }

        let mut paths: Vec<String> = Vec::with_capacity(new.media.len());
        for item in &new.media {
            let path = item.path.trim();
            if path.is_empty() {
                return Err(DomainError::validation("Media path must not be empty"));
            }
            if paths.iter().any(|p| p == path) {
                return Err(DomainError::validation(format!("Media {path} listed twice")));
            }
            paths.push(path.to_string());
        }
        let mut drafts = self.uploads.drafts_of(author, &paths).await?;

        let post = Post::new(author, content, new.visibility);
        let mut media = Vec::with_capacity(paths.len());
        for (item, path) in new.media.into_iter().zip(paths) {
            let Some(upload) = drafts.remove(&path) else {
                return Err(DomainError::validation(format!(
                    "No pending upload of yours at {path}"
                )));
            };
            let name = match item.name.trim() {
                "" => upload.name,
                name => name.to_string(),
            };
            media.push(PostMedia::new(
                post.id,
                name,
                upload.content_type,
                upload.path,
                upload.size as f64,
            ));
        }

        let post = self.posts.create_with_media(post, media).await?;

        tracing::info!(post_id = %post.id, %author, "Post created");
        self.view(post, Some(author)).await
    }

    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<PostView, DomainError> {
        let mut post = self.find_owned(actor, id).await?;

        if let Some(content) = changes.content {
            let content = content.trim();
            if content.is_empty() {
                return Err(DomainError::validation("Post content must not be empty"));
            }
            post.content = content.to_string();
        }
        if let Some(visibility) = changes.visibility {
            post.visibility = visibility;
        }
        post.updated_at = Utc::now();

        let post = self.posts.update(post).await?;
        self.view(post, Some(actor)).await
    }

    /// Delete a post with everything hanging off it, then its media files.
    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), DomainError> {
        self.find_owned(actor, id).await?;

        let removed = self.posts.delete_with_dependents(id).await?;
        for media in &removed {
            self.uploads.delete_file(&media.path).await;
        }

        tracing::info!(post_id = %id, media = removed.len(), "Post deleted");
        Ok(())
    }

    pub async fn statistic(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<PostStatistic, DomainError> {
        let post = self.find_visible(id, viewer).await?;
        let counts = self.comments.count_by_posts(&[post.id]).await?;
        let reactions = self.reactions.summary(ReactionTarget::Post, post.id).await?;

        Ok(PostStatistic {
            comment: counts.get(&post.id).copied().unwrap_or(0),
            share: 0,
            reactions,
        })
    }

    pub async fn react(
        &self,
        actor: Uuid,
        id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<ToggleOutcome, DomainError> {
        let post = self.find_visible(id, Some(actor)).await?;
        self.reactions
            .toggle(actor, ReactionTarget::Post, post.id, reaction_type)
            .await
    }

    /// A post the viewer may see. Other profiles' private posts read as missing.
    pub async fn find_visible(&self, id: Uuid, viewer: Option<Uuid>) -> Result<Post, DomainError> {
        match self.posts.find_by_id(id).await? {
            Some(post) if post.is_visible_to(viewer) => Ok(post),
            _ => Err(DomainError::not_found("Post", id)),
        }
    }

    async fn find_owned(&self, actor: Uuid, id: Uuid) -> Result<Post, DomainError> {
        let post = self.find_visible(id, Some(actor)).await?;
        if post.created_by != actor {
            return Err(DomainError::Forbidden(
                "Only the author can change this post".to_string(),
            ));
        }
        Ok(post)
    }

    async fn view(&self, post: Post, viewer: Option<Uuid>) -> Result<PostView, DomainError> {
        let id = post.id;
        self.feed
            .posts(&[post], viewer)
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal(format!("Post {id} could not be assembled")))
    }
}
