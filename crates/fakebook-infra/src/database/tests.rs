use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use uuid::Uuid;

use fakebook_core::domain::{Post, PostVisibility, Reaction, ReactionTarget, ReactionType};
use fakebook_core::error::RepoError;
use fakebook_core::pagination::PageRequest;
use fakebook_core::ports::{
    BaseRepository, FeedFilter, FileUploadRepository, PostCommentRepository, PostRepository,
    ReactionRepository, TokenRepository,
};

use crate::database::entity::{post, reaction};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresFileUploadRepository, PostgresPostRepository,
    PostgresReactionRepository, PostgresTokenRepository,
};

/// Debug dump of every statement the mock connection received.
fn executed_sql(db: DatabaseConnection) -> String {
    format!("{:?}", db.into_transaction_log())
}

fn post_model(created_by: Uuid, visibility: PostVisibility, minutes_ago: i64) -> post::Model {
    let at = Utc::now() - TimeDelta::minutes(minutes_ago);
    post::Model {
        id: Uuid::new_v4(),
        content: "Hello".to_owned(),
        created_by,
        visibility: visibility.code(),
        created_at: at.into(),
        updated_at: at.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let author = Uuid::new_v4();
    let model = post_model(author, PostVisibility::Private, 0);
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.created_by, author);
    assert_eq!(post.visibility, PostVisibility::Private);
}

#[tokio::test]
async fn test_timeline_query_filters_by_visibility_and_cursor() {
    let viewer = Uuid::new_v4();
    let before = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_model(viewer, PostVisibility::Private, 1),
            post_model(Uuid::new_v4(), PostVisibility::Public, 2),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = repo
        .list(
            FeedFilter::Timeline { viewer },
            PageRequest::posts(Some(before), Some(2)),
        )
        .await
        .unwrap();
    assert_eq!(posts.len(), 2);

    let sql = executed_sql(repo.db);
    assert!(sql.contains("visibility"));
    assert!(sql.contains(" OR "));
    assert!(sql.contains("created_at"));
    assert!(sql.contains(" < "));
    assert!(sql.contains("ORDER BY"));
    assert!(sql.contains("LIMIT"));
}

#[tokio::test]
async fn test_unknown_visibility_code_reads_as_private() {
    let mut model = post_model(Uuid::new_v4(), PostVisibility::Public, 0);
    model.visibility = 42;
    let id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let post: Post = PostgresPostRepository::new(db)
        .find_by_id(id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(post.visibility, PostVisibility::Private);
}

#[tokio::test]
async fn test_reaction_with_unknown_target_is_a_query_error() {
    let model = reaction::Model {
        id: Uuid::new_v4(),
        target_type: 9,
        target_id: Uuid::new_v4(),
        reacted_by: Uuid::new_v4(),
        reaction_type: ReactionType::Like.code(),
        created_at: Utc::now().into(),
    };
    let profile = model.reacted_by;
    let target_id = model.target_id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let result = PostgresReactionRepository::new(db)
        .find_by_profile(profile, ReactionTarget::Post, target_id)
        .await;
    assert!(matches!(result, Err(RepoError::Query(_))));
}

#[tokio::test]
async fn test_update_type_of_missing_reaction_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let result = PostgresReactionRepository::new(db)
        .update_type(Uuid::new_v4(), ReactionType::Love)
        .await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_insert_reaction_round_trips_codes() {
    let reaction = Reaction::new(
        ReactionTarget::Comment,
        Uuid::new_v4(),
        Uuid::new_v4(),
        ReactionType::Wow,
    );
    let model = reaction::Model {
        id: reaction.id,
        target_type: reaction.target.code(),
        target_id: reaction.target_id,
        reacted_by: reaction.reacted_by,
        reaction_type: reaction.reaction_type.code(),
        created_at: reaction.created_at.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let saved = ReactionRepository::insert(&PostgresReactionRepository::new(db), reaction.clone())
        .await
        .unwrap();
    assert_eq!(saved, reaction);
}

#[tokio::test]
async fn test_delete_post_cascades_to_dependents() {
    let post_id = Uuid::new_v4();
    let comment_id = Uuid::new_v4();
    let done = |rows| MockExecResult {
        last_insert_id: 0,
        rows_affected: rows,
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<crate::database::entity::post_media::Model>::new()])
        .append_query_results(vec![vec![std::collections::BTreeMap::from([(
            "id",
            sea_orm::Value::from(comment_id),
        )])]])
        .append_exec_results(vec![done(3), done(1), done(0), done(1)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let media = repo.delete_with_dependents(post_id).await.unwrap();
    assert!(media.is_empty());

    let sql = executed_sql(repo.db);
    assert_eq!(sql.matches("DELETE FROM").count(), 4);
    assert!(sql.contains("fakebook_reactions"));
    assert!(sql.contains("fakebook_post_comments"));
    assert!(sql.contains("fakebook_post_media"));
    assert!(sql.contains("fakebook_posts"));
}

#[tokio::test]
async fn test_delete_missing_comment_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let result = PostgresCommentRepository::new(db)
        .delete_with_reactions(Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_delete_expired_tokens_reports_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 4,
        }])
        .into_connection();

    let removed = PostgresTokenRepository::new(db)
        .delete_expired(Utc::now())
        .await
        .unwrap();
    assert_eq!(removed, 4);
}

#[tokio::test]
async fn test_mark_used_is_scoped_to_uploader() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresFileUploadRepository::new(db);
    let marked = repo
        .mark_used(Uuid::new_v4(), &["p/uploads/a.png".to_string()])
        .await
        .unwrap();
    assert_eq!(marked, 1);

    let sql = executed_sql(repo.db);
    assert!(sql.contains("UPDATE"));
    assert!(sql.contains("is_draft"));
    assert!(sql.contains("uploaded_by"));
    assert!(sql.contains("path"));
}

#[tokio::test]
async fn test_find_by_no_paths_skips_the_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let repo = PostgresFileUploadRepository::new(db);
    assert!(repo.find_by_paths(&[]).await.unwrap().is_empty());
    assert!(!executed_sql(repo.db).contains("SELECT"));
}
