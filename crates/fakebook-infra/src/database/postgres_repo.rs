//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use fakebook_core::domain::{
    ExternalProvider, FileUpload, Post, PostComment, PostMedia, PostVisibility,
    Profile, Reaction, ReactionTarget, ReactionType, User, UserExternal,
};
use fakebook_core::error::RepoError;
use fakebook_core::pagination::PageRequest;
use fakebook_core::ports::{
    BaseRepository, FeedFilter, FileUploadRepository, PostCommentRepository, PostMediaRepository,
    PostRepository, ProfileRepository, ReactionCount, ReactionRepository, TokenRepository,
    UserExternalRepository, UserRepository,
};
use fakebook_core::services::mask_email;

use super::entity::{
    file_upload, post, post_comment, post_media, profile, reaction, token, user, user_external,
};
use super::postgres_base::{PostgresBaseRepository, db_err, to_domain};

pub type PostgresUserRepository = PostgresBaseRepository<user::Entity>;
pub type PostgresTokenRepository = PostgresBaseRepository<token::Entity>;
pub type PostgresUserExternalRepository = PostgresBaseRepository<user_external::Entity>;
pub type PostgresProfileRepository = PostgresBaseRepository<profile::Entity>;
pub type PostgresPostRepository = PostgresBaseRepository<post::Entity>;
pub type PostgresPostMediaRepository = PostgresBaseRepository<post_media::Entity>;
pub type PostgresCommentRepository = PostgresBaseRepository<post_comment::Entity>;
pub type PostgresReactionRepository = PostgresBaseRepository<reaction::Entity>;
pub type PostgresFileUploadRepository = PostgresBaseRepository<file_upload::Entity>;

/// Every Postgres repository over one connection pool.
pub struct PostgresRepositories {
    pub users: Arc<PostgresUserRepository>,
    pub tokens: Arc<PostgresTokenRepository>,
    pub externals: Arc<PostgresUserExternalRepository>,
    pub profiles: Arc<PostgresProfileRepository>,
    pub posts: Arc<PostgresPostRepository>,
    pub media: Arc<PostgresPostMediaRepository>,
    pub comments: Arc<PostgresCommentRepository>,
    pub reactions: Arc<PostgresReactionRepository>,
    pub uploads: Arc<PostgresFileUploadRepository>,
}

impl PostgresRepositories {
    pub fn new(db: DbConn) -> Self {
        Self {
            users: Arc::new(PostgresBaseRepository::new(db.clone())),
            tokens: Arc::new(PostgresBaseRepository::new(db.clone())),
            externals: Arc::new(PostgresBaseRepository::new(db.clone())),
            profiles: Arc::new(PostgresBaseRepository::new(db.clone())),
            posts: Arc::new(PostgresBaseRepository::new(db.clone())),
            media: Arc::new(PostgresBaseRepository::new(db.clone())),
            comments: Arc::new(PostgresBaseRepository::new(db.clone())),
            reactions: Arc::new(PostgresBaseRepository::new(db.clone())),
            uploads: Arc::new(PostgresBaseRepository::new(db)),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> DateTimeWithTimeZone {
    at.into()
}

/// Apply the cursor window and ordering shared by every feed query.
fn paginate<E, C>(query: Select<E>, created_at: C, id: C, page: PageRequest) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let query = match page.before {
        Some(before) => query.filter(created_at.lt(timestamp(before))),
        None => query,
    };
    query
        .order_by_desc(created_at)
        .order_by_desc(id)
        .limit(u64::from(page.limit))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let result = user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = token::Entity::delete_many()
            .filter(token::Column::ExpiredAt.lte(timestamp(now)))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl UserExternalRepository for PostgresUserExternalRepository {
    async fn find_link(
        &self,
        user_id: Uuid,
        provider: ExternalProvider,
    ) -> Result<Option<UserExternal>, RepoError> {
        let result = user_external::Entity::find()
            .filter(user_external::Column::UserId.eq(user_id))
            .filter(user_external::Column::Provider.eq(provider.code()))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        result.map(to_domain).transpose()
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Profile>, RepoError> {
        let result = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .order_by_asc(profile::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Profile>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = profile::Entity::find()
            .filter(profile::Column::ProfileId.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, filter: FeedFilter, page: PageRequest) -> Result<Vec<Post>, RepoError> {
        let public = PostVisibility::Public.code();
        let query = match filter {
            FeedFilter::Timeline { viewer } => post::Entity::find().filter(
                Condition::any()
                    .add(post::Column::Visibility.eq(public))
                    .add(post::Column::CreatedBy.eq(viewer)),
            ),
            FeedFilter::Author {
                profile_id,
                include_private,
            } => {
                let query = post::Entity::find().filter(post::Column::CreatedBy.eq(profile_id));
                if include_private {
                    query
                } else {
                    query.filter(post::Column::Visibility.eq(public))
                }
            }
        };

        let result = paginate(query, post::Column::CreatedAt, post::Column::Id, page)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create_with_media(
        &self,
        post: Post,
        media: Vec<PostMedia>,
    ) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let author = post.created_by;
        let model = post::ActiveModel::from(post)
            .insert(&txn)
            .await
            .map_err(db_err)?;

        if !media.is_empty() {
            let paths: Vec<String> = media.iter().map(|m| m.path.clone()).collect();
            post_media::Entity::insert_many(media.into_iter().map(post_media::ActiveModel::from))
                .exec(&txn)
                .await
                .map_err(db_err)?;

            file_upload::Entity::update_many()
                .col_expr(file_upload::Column::IsDraft, Expr::value(false))
                .filter(file_upload::Column::UploadedBy.eq(author))
                .filter(file_upload::Column::Path.is_in(paths))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn delete_with_dependents(&self, id: Uuid) -> Result<Vec<PostMedia>, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let media = post_media::Entity::find()
            .filter(post_media::Column::PostId.eq(id))
            .all(&txn)
            .await
            .map_err(db_err)?;

        let comment_ids: Vec<Uuid> = post_comment::Entity::find()
            .select_only()
            .column(post_comment::Column::Id)
            .filter(post_comment::Column::PostId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_err)?;

        let reactions_on_post = Condition::all()
            .add(reaction::Column::TargetType.eq(ReactionTarget::Post.code()))
            .add(reaction::Column::TargetId.eq(id));
        let mut targets = Condition::any().add(reactions_on_post);
        if !comment_ids.is_empty() {
            targets = targets.add(
                Condition::all()
                    .add(reaction::Column::TargetType.eq(ReactionTarget::Comment.code()))
                    .add(reaction::Column::TargetId.is_in(comment_ids)),
            );
        }
        reaction::Entity::delete_many()
            .filter(targets)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        post_comment::Entity::delete_many()
            .filter(post_comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        post_media::Entity::delete_many()
            .filter(post_media::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let deleted = post::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if deleted.rows_affected == 0 {
            // Dropping the transaction rolls it back.
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(db_err)?;
        Ok(media.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostMediaRepository for PostgresPostMediaRepository {
    async fn find_by_posts(&self, post_ids: &[Uuid]) -> Result<Vec<PostMedia>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = post_media::Entity::find()
            .filter(post_media::Column::PostId.is_in(post_ids.iter().copied()))
            .order_by_asc(post_media::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostCommentRepository for PostgresCommentRepository {
    async fn list_for_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<PostComment>, RepoError> {
        let query = post_comment::Entity::find().filter(post_comment::Column::PostId.eq(post_id));

        let result = paginate(
            query,
            post_comment::Column::CreatedAt,
            post_comment::Column::Id,
            page,
        )
        .all(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = post_comment::Entity::find()
            .select_only()
            .column(post_comment::Column::PostId)
            .column_as(Expr::col(post_comment::Column::Id).count(), "count")
            .filter(post_comment::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(post_comment::Column::PostId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count.max(0) as u64))
            .collect())
    }

    async fn delete_with_reactions(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        reaction::Entity::delete_many()
            .filter(reaction::Column::TargetType.eq(ReactionTarget::Comment.code()))
            .filter(reaction::Column::TargetId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let deleted = post_comment::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if deleted.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(db_err)
    }
}

#[async_trait]
impl ReactionRepository for PostgresReactionRepository {
    async fn find_by_profile(
        &self,
        profile_id: Uuid,
        target: ReactionTarget,
        target_id: Uuid,
    ) -> Result<Option<Reaction>, RepoError> {
        let result = reaction::Entity::find()
            .filter(reaction::Column::ReactedBy.eq(profile_id))
            .filter(reaction::Column::TargetType.eq(target.code()))
            .filter(reaction::Column::TargetId.eq(target_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        result.map(to_domain).transpose()
    }

    async fn find_many_by_profile(
        &self,
        profile_id: Uuid,
        target: ReactionTarget,
        target_ids: &[Uuid],
    ) -> Result<Vec<Reaction>, RepoError> {
        if target_ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = reaction::Entity::find()
            .filter(reaction::Column::ReactedBy.eq(profile_id))
            .filter(reaction::Column::TargetType.eq(target.code()))
            .filter(reaction::Column::TargetId.is_in(target_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        result.into_iter().map(to_domain).collect()
    }

    async fn insert(&self, reaction: Reaction) -> Result<Reaction, RepoError> {
        BaseRepository::<Reaction, Uuid>::insert(self, reaction).await
    }

    async fn update_type(&self, id: Uuid, reaction_type: ReactionType) -> Result<(), RepoError> {
        let result = reaction::Entity::update_many()
            .col_expr(
                reaction::Column::ReactionType,
                Expr::value(reaction_type.code()),
            )
            .filter(reaction::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
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
        if target_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(Uuid, i16, i64)> = reaction::Entity::find()
            .select_only()
            .column(reaction::Column::TargetId)
            .column(reaction::Column::ReactionType)
            .column_as(Expr::col(reaction::Column::Id).count(), "count")
            .filter(reaction::Column::TargetType.eq(target.code()))
            .filter(reaction::Column::TargetId.is_in(target_ids.iter().copied()))
            .group_by(reaction::Column::TargetId)
            .group_by(reaction::Column::ReactionType)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(target_id, code, count)| ReactionCount {
                target_id,
                reaction_type: ReactionType::from_code(code),
                count: count.max(0) as u64,
            })
            .collect())
    }
}

#[async_trait]
impl FileUploadRepository for PostgresFileUploadRepository {
    async fn find_by_paths(&self, paths: &[String]) -> Result<Vec<FileUpload>, RepoError> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let result = file_upload::Entity::find()
            .filter(file_upload::Column::Path.is_in(paths.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn mark_used(&self, uploader: Uuid, paths: &[String]) -> Result<u64, RepoError> {
        if paths.is_empty() {
            return Ok(0);
        }
        let result = file_upload::Entity::update_many()
            .col_expr(file_upload::Column::IsDraft, Expr::value(false))
            .filter(file_upload::Column::UploadedBy.eq(uploader))
            .filter(file_upload::Column::Path.is_in(paths.iter().cloned()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected)
    }

    async fn find_drafts_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FileUpload>, RepoError> {
        let result = file_upload::Entity::find()
            .filter(file_upload::Column::IsDraft.eq(true))
            .filter(file_upload::Column::CreatedAt.lt(timestamp(cutoff)))
            .order_by_asc(file_upload::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
