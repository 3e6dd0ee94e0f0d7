//! Reaction entity. One row per (reacted_by, target_type, target_id).

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use fakebook_core::domain::{Reaction, ReactionTarget, ReactionType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fakebook_reactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub target_type: i16,
    pub target_id: Uuid,
    pub reacted_by: Uuid,
    pub reaction_type: i16,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Reaction {
    type Error = String;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let target = ReactionTarget::from_code(model.target_type)
            .ok_or_else(|| format!("unknown reaction target code {}", model.target_type))?;

        Ok(Self {
            id: model.id,
            target,
            target_id: model.target_id,
            reacted_by: model.reacted_by,
            reaction_type: ReactionType::from_code(model.reaction_type),
            created_at: model.created_at.into(),
        })
    }
}

impl From<Reaction> for ActiveModel {
    fn from(reaction: Reaction) -> Self {
        Self {
            id: Set(reaction.id),
            target_type: Set(reaction.target.code()),
            target_id: Set(reaction.target_id),
            reacted_by: Set(reaction.reacted_by),
            reaction_type: Set(reaction.reaction_type.code()),
            created_at: Set(reaction.created_at.into()),
        }
    }
}
