//! In-memory repositories.
//!
//! [`InMemoryStore`] implements every repository port over process-local
//! tables. It backs the server when no database is configured and the
//! service-level tests. Unique indexes of the Postgres schema are enforced
//! here too, so conflicts surface as [`RepoError::Constraint`] either way.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use fakebook_core::domain::{
    AccessToken, ExternalProvider, FileUpload, Post, PostComment, PostMedia, PostVisibility,
    Profile, Reaction, ReactionTarget, ReactionType, User, UserExternal,
};
use fakebook_core::error::RepoError;
use fakebook_core::pagination::PageRequest;
use fakebook_core::ports::{
    BaseRepository, FeedFilter, FileUploadRepository, PostCommentRepository, PostMediaRepository,
    PostRepository, ProfileRepository, ReactionCount, ReactionRepository, TokenRepository,
    UserExternalRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    tokens: HashMap<Uuid, AccessToken>,
    externals: HashMap<Uuid, UserExternal>,
    profiles: HashMap<Uuid, Profile>,
    posts: HashMap<Uuid, Post>,
    media: HashMap<Uuid, PostMedia>,
    comments: HashMap<Uuid, PostComment>,
    reactions: HashMap<Uuid, Reaction>,
    uploads: HashMap<Uuid, FileUpload>,
}

/// A row type stored in one of the tables.
trait Row: Clone + Send + Sync + 'static {
    fn key(&self) -> Uuid;
    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Name of the unique index another row already occupies, if any.
    fn conflict(&self, _tables: &Tables) -> Option<&'static str> {
        None
    }

    /// Remove the rows whose foreign keys cascade from the deleted row `key`.
    fn cascade(_tables: &mut Tables, _key: Uuid) {}
}

/// Rows of `table` other than `row` itself.
fn others<'a, T: Row>(row: &'a T, table: &'a HashMap<Uuid, T>) -> impl Iterator<Item = &'a T> {
    let key = row.key();
    table.values().filter(move |other| other.key() != key)
}

impl Row for User {
    fn key(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }
    fn cascade(tables: &mut Tables, key: Uuid) {
        tables.tokens.retain(|_, t| t.user_id != key);
        tables.externals.retain(|_, e| e.user_id != key);

        let profile_ids: Vec<Uuid> = tables
            .profiles
            .values()
            .filter(|p| p.user_id == key)
            .map(|p| p.profile_id)
            .collect();
        for profile_id in profile_ids {
            tables.profiles.remove(&profile_id);
            Profile::cascade(tables, profile_id);
        }
    }

    fn conflict(&self, tables: &Tables) -> Option<&'static str> {
        others(self, &tables.users).find_map(|other| {
            if other.email == self.email {
                Some("users_email_key")
            } else if other.username == self.username {
                Some("users_username_key")
            } else {
                None
            }
        })
    }
}

impl Row for AccessToken {
    fn key(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.tokens
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.tokens
    }
}

impl Row for UserExternal {
    fn key(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.externals
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.externals
    }
}

impl Row for Profile {
    fn key(&self) -> Uuid {
        self.profile_id
    }
    fn cascade(tables: &mut Tables, key: Uuid) {
        let post_ids: HashSet<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.created_by == key)
            .map(|p| p.id)
            .collect();
        tables.posts.retain(|id, _| !post_ids.contains(id));
        tables.media.retain(|_, m| !post_ids.contains(&m.post_id));
        tables
            .comments
            .retain(|_, c| c.created_by != key && !post_ids.contains(&c.post_id));
        tables.reactions.retain(|_, r| r.reacted_by != key);
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.profiles
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.profiles
    }
}

impl Row for Post {
    fn key(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }
}

impl Row for PostMedia {
    fn key(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.media
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.media
    }
}

impl Row for PostComment {
    fn key(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }
}

impl Row for Reaction {
    fn key(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.reactions
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.reactions
    }
    fn conflict(&self, tables: &Tables) -> Option<&'static str> {
        others(self, &tables.reactions)
            .any(|other| {
                other.reacted_by == self.reacted_by
                    && other.target == self.target
                    && other.target_id == self.target_id
            })
            .then_some("fakebook_reactions_unique_target_profile")
    }
}

impl Row for FileUpload {
    fn key(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.uploads
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.uploads
    }
    fn conflict(&self, tables: &Tables) -> Option<&'static str> {
        others(self, &tables.uploads)
            .any(|other| other.path == self.path)
            .then_some("file_uploads_path_key")
    }
}

/// Insert `row`, enforcing the primary key and unique indexes.
fn insert_row<T: Row>(tables: &mut Tables, row: T) -> Result<T, RepoError> {
    if T::table(tables).contains_key(&row.key()) {
        return Err(RepoError::Constraint("duplicate primary key".to_string()));
    }
    if let Some(index) = row.conflict(tables) {
        return Err(RepoError::Constraint(format!(
            "duplicate key value violates unique constraint \"{index}\""
        )));
    }
    T::table_mut(tables).insert(row.key(), row.clone());
    Ok(row)
}

/// Newest first, ties broken by id, then the cursor window and limit.
fn page_of<T: Clone>(
    rows: impl Iterator<Item = T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    id: impl Fn(&T) -> Uuid,
    page: PageRequest,
) -> Vec<T> {
    let mut rows: Vec<T> = rows.filter(|row| page.admits(created_at(row))).collect();
    rows.sort_by(|a, b| {
        created_at(b)
            .cmp(&created_at(a))
            .then_with(|| id(b).cmp(&id(a)))
    });
    rows.truncate(usize::from(page.limit));
    rows
}

/// Process-local store implementing every repository port.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(private_bounds)]
#[async_trait]
impl<T: Row> BaseRepository<T, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        insert_row(&mut tables, entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&entity.key()) {
            return Err(RepoError::NotFound);
        }
        if let Some(index) = entity.conflict(&tables) {
            return Err(RepoError::Constraint(format!(
                "duplicate key value violates unique constraint \"{index}\""
            )));
        }
        T::table_mut(&mut tables).insert(entity.key(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::table_mut(&mut tables).remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        T::cascade(&mut tables, id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.tokens.len();
        tables.tokens.retain(|_, token| token.expired_at > now);
        Ok((before - tables.tokens.len()) as u64)
    }
}

#[async_trait]
impl UserExternalRepository for InMemoryStore {
    async fn find_link(
        &self,
        user_id: Uuid,
        provider: ExternalProvider,
    ) -> Result<Option<UserExternal>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .externals
            .values()
            .find(|link| link.user_id == user_id && link.provider == provider)
            .cloned())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Profile>, RepoError> {
        let tables = self.tables.read().await;
        let mut profiles: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        profiles.sort_by_key(|p| (p.created_at, p.profile_id));
        Ok(profiles)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Profile>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.profiles.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list(&self, filter: FeedFilter, page: PageRequest) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let selected = tables.posts.values().filter(|post| match filter {
            FeedFilter::Timeline { viewer } => {
                post.visibility == PostVisibility::Public || post.created_by == viewer
            }
            FeedFilter::Author {
                profile_id,
                include_private,
            } => {
                post.created_by == profile_id
                    && (include_private || post.visibility == PostVisibility::Public)
            }
        });
        Ok(page_of(selected.cloned(), |p| p.created_at, |p| p.id, page))
    }

    async fn create_with_media(
        &self,
        post: Post,
        media: Vec<PostMedia>,
    ) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if media
            .iter()
            .any(|item| tables.media.contains_key(&item.id))
        {
            return Err(RepoError::Constraint("duplicate primary key".to_string()));
        }
        let post = insert_row(&mut tables, post)?;
        for item in media {
            if let Some(upload) = tables
                .uploads
                .values_mut()
                .find(|u| u.path == item.path && u.uploaded_by == post.created_by)
            {
                upload.is_draft = false;
            }
            tables.media.insert(item.id, item);
        }
        Ok(post)
    }

    async fn delete_with_dependents(&self, id: Uuid) -> Result<Vec<PostMedia>, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let comment_ids: HashSet<Uuid> = tables
            .comments
            .values()
            .filter(|c| c.post_id == id)
            .map(|c| c.id)
            .collect();
        tables.reactions.retain(|_, r| match r.target {
            ReactionTarget::Post => r.target_id != id,
            ReactionTarget::Comment => !comment_ids.contains(&r.target_id),
        });
        tables.comments.retain(|_, c| c.post_id != id);

        let media_ids: Vec<Uuid> = tables
            .media
            .values()
            .filter(|m| m.post_id == id)
            .map(|m| m.id)
            .collect();
        Ok(media_ids
            .iter()
            .filter_map(|media_id| tables.media.remove(media_id))
            .collect())
    }
}

#[async_trait]
impl PostMediaRepository for InMemoryStore {
    async fn find_by_posts(&self, post_ids: &[Uuid]) -> Result<Vec<PostMedia>, RepoError> {
        let tables = self.tables.read().await;
        let mut media: Vec<PostMedia> = tables
            .media
            .values()
            .filter(|m| post_ids.contains(&m.post_id))
            .cloned()
            .collect();
        media.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(media)
    }
}

#[async_trait]
impl PostCommentRepository for InMemoryStore {
    async fn list_for_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<PostComment>, RepoError> {
        let tables = self.tables.read().await;
        let selected = tables.comments.values().filter(|c| c.post_id == post_id);
        Ok(page_of(selected.cloned(), |c| c.created_at, |c| c.id, page))
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for comment in tables.comments.values() {
            if post_ids.contains(&comment.post_id) {
                *counts.entry(comment.post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn delete_with_reactions(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.comments.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables
            .reactions
            .retain(|_, r| !(r.target == ReactionTarget::Comment && r.target_id == id));
        Ok(())
    }
}

#[async_trait]
impl ReactionRepository for InMemoryStore {
    async fn find_by_profile(
        &self,
        profile_id: Uuid,
        target: ReactionTarget,
        target_id: Uuid,
    ) -> Result<Option<Reaction>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reactions
            .values()
            .find(|r| r.reacted_by == profile_id && r.target == target && r.target_id == target_id)
            .cloned())
    }

    async fn find_many_by_profile(
        &self,
        profile_id: Uuid,
        target: ReactionTarget,
        target_ids: &[Uuid],
    ) -> Result<Vec<Reaction>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reactions
            .values()
            .filter(|r| {
                r.reacted_by == profile_id && r.target == target && target_ids.contains(&r.target_id)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, reaction: Reaction) -> Result<Reaction, RepoError> {
        BaseRepository::<Reaction, Uuid>::insert(self, reaction).await
    }

    async fn update_type(&self, id: Uuid, reaction_type: ReactionType) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let reaction = tables.reactions.get_mut(&id).ok_or(RepoError::NotFound)?;
        reaction.reaction_type = reaction_type;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        BaseRepository::<Reaction, Uuid>::delete(self, id).await
    }

    async fn count_by_targets(
        &self,
        target: ReactionTarget,
        target_ids: &[Uuid],
    ) -> Result<Vec<ReactionCount>, RepoError> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<(Uuid, ReactionType), u64> = HashMap::new();
        for reaction in tables.reactions.values() {
            if reaction.target == target && target_ids.contains(&reaction.target_id) {
                *counts
                    .entry((reaction.target_id, reaction.reaction_type))
                    .or_insert(0) += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|((target_id, reaction_type), count)| ReactionCount {
                target_id,
                reaction_type,
                count,
            })
            .collect())
    }
}

#[async_trait]
impl FileUploadRepository for InMemoryStore {
    async fn find_by_paths(&self, paths: &[String]) -> Result<Vec<FileUpload>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .uploads
            .values()
            .filter(|u| paths.contains(&u.path))
            .cloned()
            .collect())
    }

    async fn mark_used(&self, uploader: Uuid, paths: &[String]) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let mut marked = 0;
        for upload in tables.uploads.values_mut() {
            if upload.is_draft && upload.uploaded_by == uploader && paths.contains(&upload.path) {
                upload.is_draft = false;
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn find_drafts_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<FileUpload>, RepoError> {
        let tables = self.tables.read().await;
        let mut drafts: Vec<FileUpload> = tables
            .uploads
            .values()
            .filter(|u| u.is_draft && u.created_at < cutoff)
            .cloned()
            .collect();
        drafts.sort_by_key(|u| u.created_at);
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};
    use fakebook_core::domain::Gender;

    use super::*;

    fn user(username: &str, email: &str) -> User {
        User::new(
            username.to_string(),
            email.to_string(),
            "hash".to_string(),
            "Jane".to_string(),
            "Doe".to_string(),
            Gender::Female,
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        )
    }

    fn post_at(author: Uuid, visibility: PostVisibility, minutes_ago: i64) -> Post {
        let mut post = Post::new(author, "hi".to_string(), visibility);
        post.created_at = Utc::now() - TimeDelta::minutes(minutes_ago);
        post
    }

    #[tokio::test]
    async fn test_unique_email_and_username() {
        let store = InMemoryStore::new();
        BaseRepository::<User, Uuid>::insert(&store, user("jane", "jane@example.com"))
            .await
            .unwrap();

        let same_email =
            BaseRepository::<User, Uuid>::insert(&store, user("other", "jane@example.com")).await;
        assert!(matches!(same_email, Err(RepoError::Constraint(_))));

        let same_name =
            BaseRepository::<User, Uuid>::insert(&store, user("jane", "other@example.com")).await;
        assert!(matches!(same_name, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let store = InMemoryStore::new();
        let post = post_at(Uuid::new_v4(), PostVisibility::Public, 0);

        let updated = BaseRepository::<Post, Uuid>::update(&store, post.clone()).await;
        assert!(matches!(updated, Err(RepoError::NotFound)));

        let deleted = BaseRepository::<Post, Uuid>::delete(&store, post.id).await;
        assert!(matches!(deleted, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_one_reaction_per_profile_and_target() {
        let store = InMemoryStore::new();
        let profile = Uuid::new_v4();
        let target = Uuid::new_v4();

        ReactionRepository::insert(
            &store,
            Reaction::new(ReactionTarget::Post, target, profile, ReactionType::Like),
        )
        .await
        .unwrap();

        let second = ReactionRepository::insert(
            &store,
            Reaction::new(ReactionTarget::Post, target, profile, ReactionType::Sad),
        )
        .await;
        assert!(matches!(second, Err(RepoError::Constraint(_))));

        // Same target id under the other kind is a different target.
        ReactionRepository::insert(
            &store,
            Reaction::new(ReactionTarget::Comment, target, profile, ReactionType::Sad),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_timeline_page_is_newest_first_with_exclusive_cursor() {
        let store = InMemoryStore::new();
        let viewer = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let newest = post_at(stranger, PostVisibility::Public, 1);
        let own_private = post_at(viewer, PostVisibility::Private, 2);
        let hidden = post_at(stranger, PostVisibility::Private, 3);
        let oldest = post_at(stranger, PostVisibility::Public, 4);
        for post in [&newest, &own_private, &hidden, &oldest] {
            BaseRepository::<Post, Uuid>::insert(&store, post.clone())
                .await
                .unwrap();
        }

        let first = store
            .list(FeedFilter::Timeline { viewer }, PageRequest::posts(None, Some(2)))
            .await
            .unwrap();
        assert_eq!(first, vec![newest, own_private.clone()]);

        let second = store
            .list(
                FeedFilter::Timeline { viewer },
                PageRequest::posts(Some(own_private.created_at), Some(2)),
            )
            .await
            .unwrap();
        assert_eq!(second, vec![oldest]);
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();
        let post = post_at(author, PostVisibility::Public, 0);
        let media = PostMedia::new(
            post.id,
            "cat.png".to_string(),
            "image/png".to_string(),
            "p/uploads/cat.png".to_string(),
            10.0,
        );
        store
            .create_with_media(post.clone(), vec![media.clone()])
            .await
            .unwrap();

        let comment = PostComment::new(post.id, author, "nice".to_string());
        BaseRepository::<PostComment, Uuid>::insert(&store, comment.clone())
            .await
            .unwrap();
        for (target, id) in [(ReactionTarget::Post, post.id), (ReactionTarget::Comment, comment.id)] {
            ReactionRepository::insert(&store, Reaction::new(target, id, author, ReactionType::Love))
                .await
                .unwrap();
        }

        let removed = store.delete_with_dependents(post.id).await.unwrap();
        assert_eq!(removed, vec![media]);

        let tables = store.tables.read().await;
        assert!(tables.posts.is_empty());
        assert!(tables.media.is_empty());
        assert!(tables.comments.is_empty());
        assert!(tables.reactions.is_empty());
    }

    #[tokio::test]
    async fn test_mark_used_and_draft_cutoff() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let mut stale = FileUpload::draft(
            "a.png".to_string(),
            "o/uploads/a.png".to_string(),
            "image/png".to_string(),
            1,
            owner,
        );
        stale.created_at = Utc::now() - TimeDelta::hours(48);
        let fresh = FileUpload::draft(
            "b.png".to_string(),
            "o/uploads/b.png".to_string(),
            "image/png".to_string(),
            1,
            owner,
        );
        for upload in [stale.clone(), fresh.clone()] {
            BaseRepository::<FileUpload, Uuid>::insert(&store, upload)
                .await
                .unwrap();
        }

        let cutoff = Utc::now() - TimeDelta::hours(24);
        let drafts = store.find_drafts_before(cutoff).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, stale.id);

        assert_eq!(
            store
                .mark_used(Uuid::new_v4(), std::slice::from_ref(&stale.path))
                .await
                .unwrap(),
            0
        );
        assert_eq!(store.mark_used(owner, &[stale.path.clone()]).await.unwrap(), 1);
        assert!(store.find_drafts_before(cutoff).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_expired_tokens() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        for offset in [-10, -1, 30] {
            BaseRepository::<AccessToken, Uuid>::insert(
                &store,
                AccessToken {
                    id: Uuid::new_v4(),
                    user_id,
                    expired_at: now + TimeDelta::minutes(offset),
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(store.delete_expired(now).await.unwrap(), 2);
        assert_eq!(store.tables.read().await.tokens.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_user_cascades_like_foreign_keys() {
        let store = InMemoryStore::new();
        let owner = user("jane", "jane@example.com");
        let other = user("john", "john@example.com");
        for u in [owner.clone(), other.clone()] {
            BaseRepository::<User, Uuid>::insert(&store, u).await.unwrap();
        }

        let profile = Profile::new(owner.id, owner.id, "Jane".to_string());
        let stranger = Profile::new(other.id, other.id, "John".to_string());
        for p in [profile.clone(), stranger.clone()] {
            BaseRepository::<Profile, Uuid>::insert(&store, p).await.unwrap();
        }
        BaseRepository::<AccessToken, Uuid>::insert(
            &store,
            AccessToken {
                id: Uuid::new_v4(),
                user_id: owner.id,
                expired_at: Utc::now() + TimeDelta::hours(1),
            },
        )
        .await
        .unwrap();

        let own_post = post_at(profile.profile_id, PostVisibility::Public, 0);
        let other_post = post_at(stranger.profile_id, PostVisibility::Public, 0);
        for post in [own_post.clone(), other_post.clone()] {
            BaseRepository::<Post, Uuid>::insert(&store, post).await.unwrap();
        }
        let reply = PostComment::new(own_post.id, stranger.profile_id, "hi".to_string());
        let left_behind = PostComment::new(other_post.id, profile.profile_id, "yo".to_string());
        for comment in [reply, left_behind] {
            BaseRepository::<PostComment, Uuid>::insert(&store, comment)
                .await
                .unwrap();
        }
        ReactionRepository::insert(
            &store,
            Reaction::new(
                ReactionTarget::Post,
                other_post.id,
                profile.profile_id,
                ReactionType::Like,
            ),
        )
        .await
        .unwrap();

        BaseRepository::<User, Uuid>::delete(&store, owner.id)
            .await
            .unwrap();

        let tables = store.tables.read().await;
        assert!(tables.tokens.is_empty());
        assert_eq!(tables.profiles.len(), 1);
        assert!(tables.profiles.contains_key(&stranger.profile_id));
        assert_eq!(tables.posts.len(), 1);
        assert!(tables.posts.contains_key(&other_post.id));
        assert!(tables.comments.is_empty());
        assert!(tables.reactions.is_empty());
        assert_eq!(tables.users.len(), 1);
    }

    #[tokio::test]
    async fn test_create_with_media_promotes_only_author_drafts() {
        let store = InMemoryStore::new();
        let author = Uuid::new_v4();
        let path = format!("{author}/uploads/a.png");
        let draft = FileUpload::draft(
            "a.png".to_string(),
            path.clone(),
            "image/png".to_string(),
            4,
            author,
        );
        BaseRepository::<FileUpload, Uuid>::insert(&store, draft.clone())
            .await
            .unwrap();

        // A post by someone else naming the same path leaves the draft alone.
        let foreign = post_at(Uuid::new_v4(), PostVisibility::Public, 0);
        let media = PostMedia::new(
            foreign.id,
            "a.png".to_string(),
            "image/png".to_string(),
            path.clone(),
            4.0,
        );
        store.create_with_media(foreign, vec![media]).await.unwrap();
        assert!(store.find_by_paths(&[path.clone()]).await.unwrap()[0].is_draft);

        let post = post_at(author, PostVisibility::Public, 0);
        let media = PostMedia::new(
            post.id,
            "a.png".to_string(),
            "image/png".to_string(),
            path.clone(),
            4.0,
        );
        store.create_with_media(post, vec![media]).await.unwrap();
        assert!(!store.find_by_paths(&[path]).await.unwrap()[0].is_draft);
    }
}
