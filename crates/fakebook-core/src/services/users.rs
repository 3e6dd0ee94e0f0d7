use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Gender, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};
use crate::services::RegisterUser;
use crate::services::auth::{
    create_account, duplicate_email, duplicate_username, validate_birth_date, validate_email,
    validate_name, validate_password, validate_username,
};
use crate::views::UserView;

const BIO_MAX: usize = 1000;

/// Fields an administrator may change on an account. `None` keeps the value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub bio: Option<String>,
    pub is_system_admin: Option<bool>,
}

/// Account lookups for the signed-in user and account management for administrators.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    pub async fn get(&self, id: Uuid) -> Result<UserView, DomainError> {
        self.find(id).await.map(|user| UserView::from(&user))
    }

    pub async fn list(&self) -> Result<Vec<UserView>, DomainError> {
        let users = self.users.list_all().await?;
        Ok(users.iter().map(UserView::from).collect())
    }

    /// Create an account with the same rules as self-registration.
    pub async fn create(&self, input: RegisterUser) -> Result<UserView, DomainError> {
        let user = create_account(self.users.as_ref(), self.passwords.as_ref(), input).await?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(UserView::from(&user))
    }

    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<UserView, DomainError> {
        let mut user = self.find(id).await?;

        if let Some(email) = changes.email {
            let email = email.trim().to_ascii_lowercase();
            validate_email(&email)?;
            if email != user.email {
                if self.users.find_by_email(&email).await?.is_some() {
                    return Err(duplicate_email());
                }
                user.email = email;
            }
        }
        if let Some(username) = changes.username {
            let username = username.trim().to_string();
            validate_username(&username)?;
            if username != user.username {
                if self.users.find_by_username(&username).await?.is_some() {
                    return Err(duplicate_username());
                }
                user.username = username;
            }
        }
        if let Some(first_name) = changes.first_name {
            let first_name = first_name.trim().to_string();
            validate_name("First name", &first_name)?;
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            let last_name = last_name.trim().to_string();
            validate_name("Last name", &last_name)?;
            user.last_name = last_name;
        }
        if let Some(birth_date) = changes.birth_date {
            validate_birth_date(birth_date, Utc::now().date_naive())?;
            user.birth_date = birth_date;
        }
        if let Some(gender) = changes.gender {
            user.gender = gender;
        }
        if let Some(bio) = changes.bio {
            let bio = bio.trim();
            if bio.chars().count() > BIO_MAX {
                return Err(DomainError::validation(format!(
                    "Bio must be at most {BIO_MAX} characters"
                )));
            }
            user.bio = (!bio.is_empty()).then(|| bio.to_string());
        }
        if let Some(is_system_admin) = changes.is_system_admin {
            user.is_system_admin = is_system_admin;
        }
        if let Some(password) = changes.password {
            validate_password(&password)?;
            user.password_hash = self
                .passwords
                .hash(&password)
                .map_err(|e| DomainError::Internal(e.to_string()))?;
        }
        user.updated_at = Utc::now();

        let user = match self.users.update(user).await {
            Ok(user) => user,
            Err(RepoError::NotFound) => return Err(DomainError::not_found("User", id)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(user_id = %id, "User updated");
        Ok(UserView::from(&user))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        match self.users.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(DomainError::not_found("User", id)),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }
}
