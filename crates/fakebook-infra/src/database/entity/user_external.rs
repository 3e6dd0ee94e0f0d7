//! External provider link entity.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use fakebook_core::domain::{ExternalProvider, UserExternal};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_externals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: i16,
    pub provider_user_id: Option<String>,
    pub linked_at: DateTimeWithTimeZone,
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

impl TryFrom<Model> for UserExternal {
    type Error = String;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let provider = ExternalProvider::from_code(model.provider)
            .ok_or_else(|| format!("unknown provider code {}", model.provider))?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            provider,
            provider_user_id: model.provider_user_id,
            linked_at: model.linked_at.into(),
        })
    }
}

impl From<UserExternal> for ActiveModel {
    fn from(link: UserExternal) -> Self {
        Self {
            id: Set(link.id),
            user_id: Set(link.user_id),
            provider: Set(link.provider.code()),
            provider_user_id: Set(link.provider_user_id),
            linked_at: Set(link.linked_at.into()),
        }
    }
}
