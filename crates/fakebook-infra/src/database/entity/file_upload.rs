//! Uploaded file bookkeeping entity.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use fakebook_core::domain::FileUpload;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "file_uploads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub path: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_by: Uuid,
    pub is_draft: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FileUpload {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            path: model.path,
            content_type: model.content_type,
            size: model.size,
            uploaded_by: model.uploaded_by,
            is_draft: model.is_draft,
            created_at: model.created_at.into(),
        }
    }
}

impl From<FileUpload> for ActiveModel {
    fn from(upload: FileUpload) -> Self {
        Self {
            id: Set(upload.id),
            name: Set(upload.name),
            path: Set(upload.path),
            content_type: Set(upload.content_type),
            size: Set(upload.size),
            uploaded_by: Set(upload.uploaded_by),
            is_draft: Set(upload.is_draft),
            created_at: Set(upload.created_at.into()),
        }
    }
}
