//! Access token (JWT session) entity.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use fakebook_core::domain::AccessToken;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub expired_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AccessToken {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            expired_at: model.expired_at.into(),
        }
    }
}

impl From<AccessToken> for ActiveModel {
    fn from(token: AccessToken) -> Self {
        Self {
            id: Set(token.id),
            user_id: Set(token.user_id),
            expired_at: Set(token.expired_at.into()),
        }
    }
}
