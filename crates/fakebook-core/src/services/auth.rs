use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{AccessToken, ExternalProvider, Gender, User, UserExternal};
use crate::error::{DomainError, RepoError};
use crate::ports::{
    AuthError, PasswordService, TokenClaims, TokenRepository, TokenService,
    UserExternalRepository, UserRepository,
};
use crate::services::mask_email;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 100;
const EMAIL_MAX: usize = 255;
const NAME_MAX: usize = 255;

/// Account registration input.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

impl RegisterUser {
    /// Trim text fields and lowercase the email.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_ascii_lowercase();
        self.username = self.username.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), DomainError> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        validate_name("First name", &self.first_name)?;
        validate_name("Last name", &self.last_name)?;
        validate_birth_date(self.birth_date, today)
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() || !email.contains('@') || email.len() > EMAIL_MAX {
        return Err(DomainError::validation("Invalid email address"));
    }
    Ok(())
}

pub(crate) fn validate_username(username: &str) -> Result<(), DomainError> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(DomainError::validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(DomainError::validation(
            "Username may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(DomainError::validation(format!(
            "Password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"
        )));
    }
    if password.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(
            "Password must not contain whitespace",
        ));
    }
    Ok(())
}

pub(crate) fn validate_name(field: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() || value.chars().count() > NAME_MAX {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);
    if birth_date < earliest || birth_date > today {
        return Err(DomainError::validation("Birth date is out of range"));
    }
    Ok(())
}

/// Validate, check uniqueness, hash and store a new account.
pub(crate) async fn create_account(
    users: &dyn UserRepository,
    passwords: &dyn PasswordService,
    input: RegisterUser,
) -> Result<User, DomainError> {
    let input = input.normalized();
    input.validate(Utc::now().date_naive())?;

    if users.find_by_email(&input.email).await?.is_some() {
        return Err(duplicate_email());
    }
    if users.find_by_username(&input.username).await?.is_some() {
        return Err(duplicate_username());
    }

    let password_hash = passwords
        .hash(&input.password)
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    let user = User::new(
        input.username,
        input.email,
        password_hash,
        input.first_name,
        input.last_name,
        input.gender,
        input.birth_date,
    );
    Ok(users.insert(user).await?)
}

pub(crate) fn duplicate_email() -> DomainError {
    DomainError::Duplicate("User with the same email already exists.".to_string())
}

pub(crate) fn duplicate_username() -> DomainError {
    DomainError::Duplicate("User with the same username already exists.".to_string())
}

/// Identity asserted by an external provider after its own handshake.
#[derive(Debug, Clone)]
pub struct ExternalLogin {
    pub provider: ExternalProvider,
    pub email: String,
    pub provider_user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A signed access token together with its account.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub token_id: Uuid,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Registration, login, per-request token checks and logout.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    externals: Arc<dyn UserExternalRepository>,
    passwords: Arc<dyn PasswordService>,
    token_service: Arc<dyn TokenService>,
    /// Hash verified against when the email is unknown, so both login
    /// failures cost one password verification.
    dummy_hash: OnceLock<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        externals: Arc<dyn UserExternalRepository>,
        passwords: Arc<dyn PasswordService>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            tokens,
            externals,
            passwords,
            token_service,
            dummy_hash: OnceLock::new(),
        }
    }

    pub async fn register(&self, input: RegisterUser) -> Result<User, DomainError> {
        let user = create_account(self.users.as_ref(), self.passwords.as_ref(), input).await?;
        tracing::info!(user_id = %user.id, email = %mask_email(&user.email), "User registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let email = email.trim().to_ascii_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!(email = %mask_email(&email), "Login for unknown email");
            self.burn_verification(password);
            return Err(DomainError::Unauthorized);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::Unauthorized);
        }

        self.issue(user).await
    }

    /// Sign in through an external provider, registering the account on first use.
    pub async fn login_external(&self, login: ExternalLogin) -> Result<Session, DomainError> {
        let email = login.email.trim().to_ascii_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::Unauthorized);
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let username = self.free_username(&email).await?;
                self.register(RegisterUser {
                    email: email.clone(),
                    username,
                    password: Uuid::new_v4().simple().to_string(),
                    first_name: login.first_name.unwrap_or_else(|| "Unknown".to_string()),
                    last_name: login.last_name.unwrap_or_else(|| "Unknown".to_string()),
                    birth_date: Utc::now().date_naive(),
                    gender: Gender::Unknown,
                })
                .await?
            }
        };

        if self
            .externals
            .find_link(user.id, login.provider)
            .await?
            .is_none()
        {
            self.externals
                .insert(UserExternal::new(
                    user.id,
                    login.provider,
                    login.provider_user_id,
                ))
                .await?;
            tracing::info!(user_id = %user.id, provider = login.provider.name(), "External login linked");
        }

        self.issue(user).await
    }

    /// Validate a bearer token and check that its session row is still live.
    pub async fn authenticate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = self.token_service.validate_token(token)?;

        let session = self
            .tokens
            .find_by_id(claims.token_id)
            .await
            .map_err(|e| AuthError::SessionStore(e.to_string()))?;

        match session {
            Some(session) if session.user_id != claims.user_id => {
                Err(AuthError::InvalidToken("Session does not match token".to_string()))
            }
            Some(session) if session.is_active_at(Utc::now()) => Ok(claims),
            Some(_) => Err(AuthError::TokenExpired),
            None => Err(AuthError::TokenRevoked),
        }
    }

    /// Revoke the session behind `token_id`. The token is rejected from now on.
    pub async fn logout(&self, token_id: Uuid) -> Result<(), DomainError> {
        match self.tokens.delete(token_id).await {
            Ok(()) | Err(RepoError::NotFound) => {
                tracing::debug!(%token_id, "Session revoked");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn providers(&self) -> &'static [ExternalProvider] {
        &ExternalProvider::ALL
    }

    pub async fn purge_expired_tokens(&self) -> Result<u64, DomainError> {
        Ok(self.tokens.delete_expired(Utc::now()).await?)
    }

    async fn issue(&self, user: User) -> Result<Session, DomainError> {
        let issued = self
            .token_service
            .generate_token(user.id, &user.email, user.roles())
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        self.tokens
            .insert(AccessToken {
                id: issued.token_id,
                user_id: user.id,
                expired_at: issued.expires_at,
            })
            .await?;

        tracing::info!(user_id = %user.id, token_id = %issued.token_id, "Session issued");

        Ok(Session {
            token: issued.token,
            token_id: issued.token_id,
            expires_in: self.token_service.expiration_seconds(),
            expires_at: issued.expires_at,
            user,
        })
    }

    /// Run one password verification that cannot succeed.
    fn burn_verification(&self, password: &str) {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash,
            None => match self.passwords.hash("fakebook-unknown-account") {
                Ok(hash) => self.dummy_hash.get_or_init(|| hash),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not prepare dummy password hash");
                    return;
                }
            },
        };
        let _ = self.passwords.verify(password, hash);
    }

    /// Username derived from the email local part, suffixed when taken.
    async fn free_username(&self, email: &str) -> Result<String, DomainError> {
        let local = email.split('@').next().unwrap_or_default();
        let mut base: String = local
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .take(USERNAME_MAX - 9)
            .collect();
        while base.chars().count() < USERNAME_MIN {
            base.push('_');
        }

        if self.users.find_by_username(&base).await?.is_none() {
            return Ok(base);
        }
        let suffix = Uuid::new_v4().simple().to_string();
        Ok(format!("{base}-{}", &suffix[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterUser {
        RegisterUser {
            email: "  Jane@Example.com ".to_string(),
            username: "jane_doe".to_string(),
            password: "secret1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
            gender: Gender::Female,
        }
        .normalized()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_normalized_lowercases_email() {
        assert_eq!(valid().email, "jane@example.com");
        assert!(valid().validate(today()).is_ok());
    }

    #[test]
    fn test_username_rules() {
        let mut input = valid();
        input.username = "jd".to_string();
        assert!(input.validate(today()).is_err());

        input.username = "jane doe".to_string();
        assert!(input.validate(today()).is_err());

        input.username = "a".repeat(51);
        assert!(input.validate(today()).is_err());

        input.username = "jane-doe_42".to_string();
        assert!(input.validate(today()).is_ok());
    }

    #[test]
    fn test_password_rules() {
        let mut input = valid();
        input.password = "short".to_string();
        assert!(input.validate(today()).is_err());

        input.password = "has space".to_string();
        assert!(input.validate(today()).is_err());

        input.password = "x".repeat(101);
        assert!(input.validate(today()).is_err());
    }

    #[test]
    fn test_birth_date_range() {
        let mut input = valid();
        input.birth_date = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();
        assert!(input.validate(today()).is_err());

        input.birth_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(input.validate(today()).is_err());
    }

    #[test]
    fn test_email_rules() {
        let mut input = valid();
        input.email = "not-an-email".to_string();
        assert!(input.validate(today()).is_err());
    }
}
