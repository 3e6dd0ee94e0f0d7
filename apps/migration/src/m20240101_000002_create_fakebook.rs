use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_user_center::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::ProfileId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::UserId).uuid().not_null())
                    .col(ColumnDef::new(Profiles::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Profiles::Avatar).string())
                    .col(timestamp(Profiles::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fakebook_profiles_user")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::Content).text().not_null().default(""))
                    .col(ColumnDef::new(Posts::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Posts::Visibility)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(Posts::CreatedAt))
                    .col(timestamp(Posts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fakebook_posts_profile")
                            .from(Posts::Table, Posts::CreatedBy)
                            .to(Profiles::Table, Profiles::ProfileId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostMedia::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostMedia::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PostMedia::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostMedia::Name).string().not_null())
                    .col(
                        ColumnDef::new(PostMedia::MediaType)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PostMedia::ContentType).string().not_null())
                    .col(ColumnDef::new(PostMedia::Path).string().not_null())
                    .col(ColumnDef::new(PostMedia::Size).double().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fakebook_post_media_post")
                            .from(PostMedia::Table, PostMedia::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostComments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostComments::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostComments::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(PostComments::Content).text().not_null())
                    .col(timestamp(PostComments::CreatedAt))
                    .col(timestamp(PostComments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fakebook_post_comments_post")
                            .from(PostComments::Table, PostComments::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fakebook_post_comments_profile")
                            .from(PostComments::Table, PostComments::CreatedBy)
                            .to(Profiles::Table, Profiles::ProfileId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Targets are polymorphic (post or comment), so only the author is a foreign key.
        manager
            .create_table(
                Table::create()
                    .table(Reactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reactions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Reactions::TargetType).small_integer().not_null())
                    .col(ColumnDef::new(Reactions::TargetId).uuid().not_null())
                    .col(ColumnDef::new(Reactions::ReactedBy).uuid().not_null())
                    .col(ColumnDef::new(Reactions::ReactionType).small_integer().not_null())
                    .col(timestamp(Reactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fakebook_reactions_profile")
                            .from(Reactions::Table, Reactions::ReactedBy)
                            .to(Profiles::Table, Profiles::ProfileId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FileUploads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FileUploads::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FileUploads::Name).string().not_null())
                    .col(
                        ColumnDef::new(FileUploads::Path)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FileUploads::ContentType).string().not_null())
                    .col(ColumnDef::new(FileUploads::Size).big_integer().not_null())
                    .col(ColumnDef::new(FileUploads::UploadedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(FileUploads::IsDraft)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(timestamp(FileUploads::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fakebook_profiles_user")
                    .table(Profiles::Table)
                    .col(Profiles::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fakebook_posts_created_at")
                    .table(Posts::Table)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fakebook_posts_author_created_at")
                    .table(Posts::Table)
                    .col(Posts::CreatedBy)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fakebook_post_media_post")
                    .table(PostMedia::Table)
                    .col(PostMedia::PostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fakebook_post_comments_post_created_at")
                    .table(PostComments::Table)
                    .col(PostComments::PostId)
                    .col(PostComments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fakebook_reactions_target")
                    .table(Reactions::Table)
                    .col(Reactions::TargetType)
                    .col(Reactions::TargetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_file_uploads_draft_created_at")
                    .table(FileUploads::Table)
                    .col(FileUploads::IsDraft)
                    .col(FileUploads::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // One reaction per profile and target.
        manager
            .create_index(
                Index::create()
                    .name("fakebook_reactions_unique_target_profile")
                    .table(Reactions::Table)
                    .col(Reactions::ReactedBy)
                    .col(Reactions::TargetType)
                    .col(Reactions::TargetId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FileUploads::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostMedia::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Profiles {
    #[sea_orm(iden = "fakebook_profiles")]
    Table,
    ProfileId,
    UserId,
    Name,
    Avatar,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    #[sea_orm(iden = "fakebook_posts")]
    Table,
    Id,
    Content,
    CreatedBy,
    Visibility,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PostMedia {
    #[sea_orm(iden = "fakebook_post_media")]
    Table,
    Id,
    PostId,
    Name,
    MediaType,
    ContentType,
    Path,
    Size,
}

#[derive(DeriveIden)]
enum PostComments {
    #[sea_orm(iden = "fakebook_post_comments")]
    Table,
    Id,
    PostId,
    CreatedBy,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Reactions {
    #[sea_orm(iden = "fakebook_reactions")]
    Table,
    Id,
    TargetType,
    TargetId,
    ReactedBy,
    ReactionType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FileUploads {
    Table,
    Id,
    Name,
    Path,
    ContentType,
    Size,
    UploadedBy,
    IsDraft,
    CreatedAt,
}
