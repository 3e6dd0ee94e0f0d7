//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use fakebook_core::domain::Gender;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: i16,
    pub birth_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub password_hash: String,
    pub is_system_admin: bool,
    pub joined_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::token::Entity")]
    Token,
    #[sea_orm(has_many = "super::profile::Entity")]
    Profile,
}

impl Related<super::token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Token.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for fakebook_core::domain::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            gender: Gender::from_code(model.gender),
            birth_date: model.birth_date,
            bio: model.bio,
            avatar: model.avatar,
            password_hash: model.password_hash,
            is_system_admin: model.is_system_admin,
            joined_at: model.joined_at.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<fakebook_core::domain::User> for ActiveModel {
    fn from(user: fakebook_core::domain::User) -> Self {
        Self {
            id: Set(user.id),
            username: Set(user.username),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            gender: Set(user.gender.code()),
            birth_date: Set(user.birth_date),
            bio: Set(user.bio),
            avatar: Set(user.avatar),
            password_hash: Set(user.password_hash),
            is_system_admin: Set(user.is_system_admin),
            joined_at: Set(user.joined_at.into()),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
