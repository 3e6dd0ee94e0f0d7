use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Reaction, ReactionTarget, ReactionToggle, ReactionType, ToggleOutcome};
use crate::error::{DomainError, RepoError};
use crate::ports::ReactionRepository;
use crate::views::ReactionSummary;

/// Toggle-style reactions and reaction counters.
///
/// Callers check that the target exists and is visible before toggling.
pub struct ReactionService {
    reactions: Arc<dyn ReactionRepository>,
}

impl ReactionService {
    pub fn new(reactions: Arc<dyn ReactionRepository>) -> Self {
        Self { reactions }
    }

    /// Apply a reaction request from `profile_id`.
    ///
    /// No reaction yet inserts one, the same type again removes it and a
    /// different type replaces it.
    pub async fn toggle(
        &self,
        profile_id: Uuid,
        target: ReactionTarget,
        target_id: Uuid,
        requested: ReactionType,
    ) -> Result<ToggleOutcome, DomainError> {
        if requested == ReactionType::Unknown {
            return Err(DomainError::validation("Unsupported reaction type"));
        }

        let existing = self
            .reactions
            .find_by_profile(profile_id, target, target_id)
            .await?;
        let outcome =
            ReactionToggle::resolve(existing.as_ref().map(|r| r.reaction_type), requested);

        match existing {
            None => {
                let reaction = Reaction::new(target, target_id, profile_id, requested);
                self.reactions.insert(reaction).await.map_err(|e| match e {
                    RepoError::Constraint(_) => DomainError::Duplicate(
                        "A concurrent reaction on this target was recorded first".to_string(),
                    ),
                    other => other.into(),
                })?;
            }
            Some(current) if outcome == ToggleOutcome::Removed => {
                self.reactions.delete(current.id).await?;
            }
            Some(current) => {
                self.reactions.update_type(current.id, requested).await?;
            }
        }

        tracing::debug!(
            %profile_id,
            target = target.entity_name(),
            %target_id,
            ?outcome,
            "Reaction toggled"
        );

        Ok(outcome)
    }

    /// Counters for many targets of one kind in a single grouped query.
    /// Targets without reactions are absent from the map.
    pub async fn summaries(
        &self,
        target: ReactionTarget,
        target_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ReactionSummary>, DomainError> {
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = self.reactions.count_by_targets(target, target_ids).await?;
        Ok(ReactionSummary::fold(&rows))
    }

    pub async fn summary(
        &self,
        target: ReactionTarget,
        target_id: Uuid,
    ) -> Result<ReactionSummary, DomainError> {
        let mut all = self.summaries(target, &[target_id]).await?;
        Ok(all.remove(&target_id).unwrap_or_default())
    }

    /// The viewer's own reaction on each of `target_ids`.
    pub async fn viewer_reactions(
        &self,
        viewer: Option<Uuid>,
        target: ReactionTarget,
        target_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ReactionType>, DomainError> {
        let Some(viewer) = viewer else {
            return Ok(HashMap::new());
        };
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let reactions = self
            .reactions
            .find_many_by_profile(viewer, target, target_ids)
            .await?;
        Ok(reactions
            .into_iter()
            .map(|r| (r.target_id, r.reaction_type))
            .collect())
    }
}
