//! Post media entity.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use fakebook_core::domain::{MediaType, PostMedia};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fakebook_post_media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub media_type: i16,
    pub content_type: String,
    pub path: String,
    pub size: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PostMedia {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            name: model.name,
            media_type: MediaType::from_code(model.media_type),
            content_type: model.content_type,
            path: model.path,
            size: model.size,
        }
    }
}

impl From<PostMedia> for ActiveModel {
    fn from(media: PostMedia) -> Self {
        Self {
            id: Set(media.id),
            post_id: Set(media.post_id),
            name: Set(media.name),
            media_type: Set(media.media_type.code()),
            content_type: Set(media.content_type),
            path: Set(media.path),
            size: Set(media.size),
        }
    }
}
