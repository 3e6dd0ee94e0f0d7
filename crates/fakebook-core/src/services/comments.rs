use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{PostComment, ReactionTarget, ReactionType, ToggleOutcome};
use crate::error::DomainError;
use crate::pagination::{CursorPage, PageRequest};
use crate::ports::PostCommentRepository;
use crate::services::{FeedAssembler, PostService, ReactionService};
use crate::views::{CommentStatistic, CommentView};

/// Comments on posts. A comment is reachable only through a post the viewer may see.
pub struct CommentService {
    comments: Arc<dyn PostCommentRepository>,
    posts: Arc<PostService>,
    reactions: Arc<ReactionService>,
    feed: Arc<FeedAssembler>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn PostCommentRepository>,
        posts: Arc<PostService>,
        reactions: Arc<ReactionService>,
        feed: Arc<FeedAssembler>,
    ) -> Self {
        Self {
            comments,
            posts,
            reactions,
            feed,
        }
    }

    pub async fn list(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<CursorPage<CommentView>, DomainError> {
        self.posts.find_visible(post_id, viewer).await?;

        let comments = self.comments.list_for_post(post_id, page).await?;
        let page = CursorPage::from_items(comments, |c| c.created_at);
        let views = self.feed.comments(&page.items, viewer).await?;
        Ok(page.with_items(views))
    }

    pub async fn create(
        &self,
        author: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<CommentView, DomainError> {
        let content = non_blank(content)?;
        self.posts.find_visible(post_id, Some(author)).await?;

        let comment = self
            .comments
            .insert(PostComment::new(post_id, author, content))
            .await?;

        tracing::debug!(comment_id = %comment.id, %post_id, "Comment created");
        self.view(comment, Some(author)).await
    }

    pub async fn get(&self, id: Uuid, viewer: Option<Uuid>) -> Result<CommentView, DomainError> {
        let comment = self.find_visible(id, viewer).await?;
        self.view(comment, viewer).await
    }

    pub async fn update(
        &self,
        actor: Uuid,
        id: Uuid,
        content: &str,
    ) -> Result<CommentView, DomainError> {
        let content = non_blank(content)?;
        let mut comment = self.find_owned(actor, id).await?;
        comment.content = content;
        comment.updated_at = Utc::now();

        let comment = self.comments.update(comment).await?;
        self.view(comment, Some(actor)).await
    }

    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), DomainError> {
        self.find_owned(actor, id).await?;
        self.comments.delete_with_reactions(id).await?;
        tracing::debug!(comment_id = %id, "Comment deleted");
        Ok(())
    }

    pub async fn react(
        &self,
        actor: Uuid,
        id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<ToggleOutcome, DomainError> {
        let comment = self.find_visible(id, Some(actor)).await?;
        self.reactions
            .toggle(actor, ReactionTarget::Comment, comment.id, reaction_type)
            .await
    }

    pub async fn statistic(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<CommentStatistic, DomainError> {
        let comment = self.find_visible(id, viewer).await?;
        let reactions = self
            .reactions
            .summary(ReactionTarget::Comment, comment.id)
            .await?;
        Ok(CommentStatistic {
            reactions,
            replies: 0,
        })
    }

    async fn find_visible(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<PostComment, DomainError> {
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))?;

        match self.posts.find_visible(comment.post_id, viewer).await {
            Ok(_) => Ok(comment),
            Err(DomainError::NotFound { .. }) => Err(DomainError::not_found("Comment", id)),
            Err(e) => Err(e),
        }
    }

    async fn find_owned(&self, actor: Uuid, id: Uuid) -> Result<PostComment, DomainError> {
        let comment = self.find_visible(id, Some(actor)).await?;
        if comment.created_by != actor {
            return Err(DomainError::Forbidden(
                "Only the author can change this comment".to_string(),
            ));
        }
        Ok(comment)
    }

    async fn view(
        &self,
        comment: PostComment,
        viewer: Option<Uuid>,
    ) -> Result<CommentView, DomainError> {
        let id = comment.id;
        self.feed
            .comments(&[comment], viewer)
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal(format!("Comment {id} could not be assembled")))
    }
}

fn non_blank(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::validation("Comment content must not be empty"));
    }
    Ok(content.to_string())
}
