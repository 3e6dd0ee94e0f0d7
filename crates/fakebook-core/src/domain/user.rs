use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gender as stored on the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn code(self) -> i16 {
        match self {
            Gender::Unknown => 0,
            Gender::Male => 1,
            Gender::Female => 2,
            Gender::Other => 3,
        }
    }

    pub fn from_code(code: i16) -> Self {
        match code {
            1 => Gender::Male,
            2 => Gender::Female,
            3 => Gender::Other,
            _ => Gender::Unknown,
        }
    }

    /// Placeholder avatar shown when the account has none.
    pub fn default_avatar(self) -> &'static str {
        match self {
            Gender::Male => "avatar/men.png",
            Gender::Female => "avatar/women.png",
            _ => "avatar/menwomen.png",
        }
    }
}

/// User entity - an account in the user center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub password_hash: String,
    pub is_system_admin: bool,
    pub joined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
        gender: Gender,
        birth_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            first_name,
            last_name,
            gender,
            birth_date,
            bio: None,
            avatar: None,
            password_hash,
            is_system_admin: false,
            joined_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Roles carried in access tokens.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec!["user".to_string()];
        if self.is_system_admin {
            roles.push("admin".to_string());
        }
        roles
    }
}
