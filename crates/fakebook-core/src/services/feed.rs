use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostComment, PostMedia, Profile, ReactionTarget};
use crate::error::DomainError;
use crate::ports::{FileStorage, PostCommentRepository, PostMediaRepository, ProfileRepository};
use crate::services::ReactionService;
use crate::views::{
    CommentStatistic, CommentView, CreatorView, MediaItemView, PostStatistic, PostView,
    UNKNOWN_CREATOR,
};

/// Builds denormalized feed items for a page of posts or comments.
///
/// Every related set (creators, media, comment counts, reaction counters,
/// the viewer's reactions) is loaded with one query keyed by the page's ids.
pub struct FeedAssembler {
    profiles: Arc<dyn ProfileRepository>,
    media: Arc<dyn PostMediaRepository>,
    comments: Arc<dyn PostCommentRepository>,
    reactions: Arc<ReactionService>,
    storage: Arc<dyn FileStorage>,
}

/// Resolves each distinct storage path to a URL once per assembly.
struct UrlResolver<'a> {
    storage: &'a dyn FileStorage,
    resolved: HashMap<String, String>,
}

impl<'a> UrlResolver<'a> {
    fn new(storage: &'a dyn FileStorage) -> Self {
        Self {
            storage,
            resolved: HashMap::new(),
        }
    }

    fn url(&mut self, path: &str) -> String {
        if let Some(url) = self.resolved.get(path) {
            return url.clone();
        }
        let url = self.storage.url(path);
        self.resolved.insert(path.to_string(), url.clone());
        url
    }
}

fn distinct(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

impl FeedAssembler {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        media: Arc<dyn PostMediaRepository>,
        comments: Arc<dyn PostCommentRepository>,
        reactions: Arc<ReactionService>,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            profiles,
            media,
            comments,
            reactions,
            storage,
        }
    }

    /// Assemble post views in the order given.
    pub async fn posts(
        &self,
        posts: &[Post],
        viewer: Option<Uuid>,
    ) -> Result<Vec<PostView>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let creator_ids = distinct(posts.iter().map(|p| p.created_by));

        let creators = self.creators(&creator_ids).await?;
        let media = self.media.find_by_posts(&post_ids).await?;
        let comment_counts = self.comments.count_by_posts(&post_ids).await?;
        let summaries = self
            .reactions
            .summaries(ReactionTarget::Post, &post_ids)
            .await?;
        let own = self
            .reactions
            .viewer_reactions(viewer, ReactionTarget::Post, &post_ids)
            .await?;

        let mut urls = UrlResolver::new(self.storage.as_ref());
        let mut media_by_post: HashMap<Uuid, Vec<MediaItemView>> = HashMap::new();
        for item in media {
            let post_id = item.post_id;
            media_by_post
                .entry(post_id)
                .or_default()
                .push(media_view(item, &mut urls));
        }

        let views = posts
            .iter()
            .map(|post| PostView {
                id: post.id,
                content: post.content.clone(),
                visibility: post.visibility,
                media_items: media_by_post.remove(&post.id).unwrap_or_default(),
                created_at: post.created_at,
                updated_at: post.updated_at,
                creator: creator_view(&creators, post.created_by, &mut urls),
                statistic: PostStatistic {
                    comment: comment_counts.get(&post.id).copied().unwrap_or(0),
                    share: 0,
                    reactions: summaries.get(&post.id).copied().unwrap_or_default(),
                },
                reaction: own.get(&post.id).copied(),
            })
            .collect();

        Ok(views)
    }

    /// Assemble comment views in the order given.
    pub async fn comments(
        &self,
        comments: &[PostComment],
        viewer: Option<Uuid>,
    ) -> Result<Vec<CommentView>, DomainError> {
        if comments.is_empty() {
            return Ok(Vec::new());
        }

        let comment_ids: Vec<Uuid> = comments.iter().map(|c| c.id).collect();
        let creator_ids = distinct(comments.iter().map(|c| c.created_by));

        let creators = self.creators(&creator_ids).await?;
        let summaries = self
            .reactions
            .summaries(ReactionTarget::Comment, &comment_ids)
            .await?;
        let own = self
            .reactions
            .viewer_reactions(viewer, ReactionTarget::Comment, &comment_ids)
            .await?;

        let mut urls = UrlResolver::new(self.storage.as_ref());
        let views = comments
            .iter()
            .map(|comment| CommentView {
                id: comment.id,
                post_id: comment.post_id,
                content: comment.content.clone(),
                created_at: comment.created_at,
                updated_at: comment.updated_at,
                creator: creator_view(&creators, comment.created_by, &mut urls),
                statistic: CommentStatistic {
                    reactions: summaries.get(&comment.id).copied().unwrap_or_default(),
                    replies: 0,
                },
                reaction: own.get(&comment.id).copied(),
            })
            .collect();

        Ok(views)
    }

    async fn creators(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Profile>, DomainError> {
        let profiles = self.profiles.find_many(ids).await?;
        Ok(profiles.into_iter().map(|p| (p.profile_id, p)).collect())
    }
}

fn media_view(item: PostMedia, urls: &mut UrlResolver<'_>) -> MediaItemView {
    MediaItemView {
        id: item.id,
        source: urls.url(&item.path),
        media_type: item.media_type.wire_name().to_string(),
        name: item.name,
        path: item.path,
    }
}

fn creator_view(
    creators: &HashMap<Uuid, Profile>,
    profile_id: Uuid,
    urls: &mut UrlResolver<'_>,
) -> CreatorView {
    match creators.get(&profile_id) {
        Some(profile) => CreatorView {
            id: profile.profile_id,
            name: profile.name.clone(),
            avatar_url: profile.avatar.as_deref().map(|path| urls.url(path)),
        },
        None => CreatorView {
            id: profile_id,
            name: UNKNOWN_CREATOR.to_string(),
            avatar_url: None,
        },
    }
}
