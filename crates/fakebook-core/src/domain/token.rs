use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted session row for an issued JWT, keyed by its `jti`.
///
/// A token is only accepted while its row exists and `expired_at` lies in
/// the future, so deleting the row revokes the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expired_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expired_at > now
    }
}

/// External identity providers an account can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalProvider {
    Google,
    Facebook,
    Twitter,
    GitHub,
    LinkedIn,
    Microsoft,
}

impl ExternalProvider {
    pub const ALL: [ExternalProvider; 6] = [
        ExternalProvider::Google,
        ExternalProvider::Microsoft,
        ExternalProvider::Facebook,
        ExternalProvider::Twitter,
        ExternalProvider::GitHub,
        ExternalProvider::LinkedIn,
    ];

    pub fn code(self) -> i16 {
        match self {
            ExternalProvider::Google => 1,
            ExternalProvider::Facebook => 2,
            ExternalProvider::Twitter => 3,
            ExternalProvider::GitHub => 4,
            ExternalProvider::LinkedIn => 5,
            ExternalProvider::Microsoft => 6,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            ExternalProvider::Google => "Google",
            ExternalProvider::Facebook => "Facebook",
            ExternalProvider::Twitter => "Twitter",
            ExternalProvider::GitHub => "GitHub",
            ExternalProvider::LinkedIn => "LinkedIn",
            ExternalProvider::Microsoft => "Microsoft",
        }
    }
}

/// Link between an account and an external provider identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserExternal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: ExternalProvider,
    pub provider_user_id: Option<String>,
    pub linked_at: DateTime<Utc>,
}

impl UserExternal {
    pub fn new(user_id: Uuid, provider: ExternalProvider, provider_user_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            provider,
            provider_user_id,
            linked_at: Utc::now(),
        }
    }
}
