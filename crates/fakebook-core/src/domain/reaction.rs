use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reaction kinds. `Unknown` is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReactionType {
    #[default]
    Unknown,
    UpVote,
    DownVote,
    Like,
    Love,
    Angry,
    Sad,
    Wow,
}

impl ReactionType {
    pub fn code(self) -> i16 {
        match self {
            ReactionType::Unknown => 0,
            ReactionType::UpVote => 1,
            ReactionType::DownVote => 2,
            ReactionType::Like => 3,
            ReactionType::Love => 4,
            ReactionType::Angry => 5,
            ReactionType::Sad => 6,
            ReactionType::Wow => 7,
        }
    }

    pub fn from_code(code: i16) -> Self {
        match code {
            1 => ReactionType::UpVote,
            2 => ReactionType::DownVote,
            3 => ReactionType::Like,
            4 => ReactionType::Love,
            5 => ReactionType::Angry,
            6 => ReactionType::Sad,
            7 => ReactionType::Wow,
            _ => ReactionType::Unknown,
        }
    }
}

/// What a reaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionTarget {
    Post,
    Comment,
}

impl ReactionTarget {
    pub fn code(self) -> i16 {
        match self {
            ReactionTarget::Post => 1,
            ReactionTarget::Comment => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(ReactionTarget::Post),
            2 => Some(ReactionTarget::Comment),
            _ => None,
        }
    }

    pub fn entity_name(self) -> &'static str {
        match self {
            ReactionTarget::Post => "Post",
            ReactionTarget::Comment => "Comment",
        }
    }
}

/// A single (profile, target) reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub target: ReactionTarget,
    pub target_id: Uuid,
    pub reacted_by: Uuid,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(
        target: ReactionTarget,
        target_id: Uuid,
        reacted_by: Uuid,
        reaction_type: ReactionType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            target_id,
            reacted_by,
            reaction_type,
            created_at: Utc::now(),
        }
    }
}

/// What a reaction request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Changed,
    Removed,
}

/// Toggle rule for reactions: same type removes, different type replaces,
/// none yet adds.
pub struct ReactionToggle;

impl ReactionToggle {
    pub fn resolve(existing: Option<ReactionType>, requested: ReactionType) -> ToggleOutcome {
        match existing {
            None => ToggleOutcome::Added,
            Some(current) if current == requested => ToggleOutcome::Removed,
            Some(_) => ToggleOutcome::Changed,
        }
    }
}
