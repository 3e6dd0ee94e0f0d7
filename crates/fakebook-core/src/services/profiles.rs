use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Profile;
use crate::error::DomainError;
use crate::ports::ProfileRepository;
use crate::services::{IncomingFile, UploadArea, UploadService};
use crate::views::ProfileView;

/// Cookie carrying the id of the profile the account is acting as.
pub const ACTIVE_PROFILE_COOKIE: &str = "fakebook_profile_active";

pub const MAX_PROFILE_NAME_LEN: usize = 100;

/// Profiles owned by an account and the active-profile rules.
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    uploads: Arc<UploadService>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, uploads: Arc<UploadService>) -> Self {
        Self { profiles, uploads }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<ProfileView>, DomainError> {
        let profiles = self.profiles.find_by_user(user_id).await?;
        Ok(profiles.iter().map(|p| self.view(p)).collect())
    }

    /// Create a profile. An account's first profile reuses the account id.
    pub async fn create(&self, user_id: Uuid, name: &str) -> Result<ProfileView, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Profile name must not be empty"));
        }
        if name.chars().count() > MAX_PROFILE_NAME_LEN {
            return Err(DomainError::validation(format!(
                "Profile name must be at most {MAX_PROFILE_NAME_LEN} characters"
            )));
        }

        let existing = self.profiles.find_by_user(user_id).await?;
        let profile_id = if existing.is_empty() {
            user_id
        } else {
            Uuid::new_v4()
        };

        let profile = self
            .profiles
            .insert(Profile::new(profile_id, user_id, name.to_string()))
            .await?;

        tracing::info!(%user_id, profile_id = %profile.profile_id, "Profile created");
        Ok(self.view(&profile))
    }

    /// Resolve the cookie value to a profile owned by `user_id`.
    ///
    /// Missing, unparsable, unknown and foreign ids all resolve to `None`.
    pub async fn resolve_active(
        &self,
        user_id: Uuid,
        cookie: Option<&str>,
    ) -> Result<Option<Profile>, DomainError> {
        let Some(profile_id) = cookie.and_then(|raw| Uuid::parse_str(raw.trim()).ok()) else {
            return Ok(None);
        };

        let profile = self.profiles.find_by_id(profile_id).await?;
        Ok(profile.filter(|p| p.is_owned_by(user_id)))
    }

    /// Like [`resolve_active`](Self::resolve_active) but fails with `NoActiveProfile`.
    pub async fn require_active(
        &self,
        user_id: Uuid,
        cookie: Option<&str>,
    ) -> Result<Profile, DomainError> {
        self.resolve_active(user_id, cookie)
            .await?
            .ok_or(DomainError::NoActiveProfile)
    }

    /// Check that `profile_id` can become the active profile of `user_id`.
    pub async fn switch(&self, user_id: Uuid, profile_id: Uuid) -> Result<ProfileView, DomainError> {
        let profile = self
            .profiles
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile", profile_id))?;

        if !profile.is_owned_by(user_id) {
            return Err(DomainError::Forbidden(
                "Profile belongs to another account".to_string(),
            ));
        }

        tracing::debug!(%user_id, %profile_id, "Active profile switched");
        Ok(self.view(&profile))
    }

    pub async fn get(&self, profile_id: Uuid) -> Result<ProfileView, DomainError> {
        self.profiles
            .find_by_id(profile_id)
            .await?
            .map(|p| self.view(&p))
            .ok_or_else(|| DomainError::not_found("Profile", profile_id))
    }

    pub fn view(&self, profile: &Profile) -> ProfileView {
        ProfileView {
            id: profile.profile_id,
            name: profile.name.clone(),
            avatar_url: profile.avatar.as_deref().map(|path| self.uploads.url(path)),
        }
    }

    /// Replace the avatar of `profile`. The previous file is removed from storage.
    pub async fn update_avatar(
        &self,
        mut profile: Profile,
        file: IncomingFile,
    ) -> Result<ProfileView, DomainError> {
        let stored = self
            .uploads
            .upload(profile.profile_id, file, UploadArea::Avatars)
            .await?;
        self.uploads
            .mark_used(profile.profile_id, std::slice::from_ref(&stored.path))
            .await?;

        let previous = profile.avatar.replace(stored.path);
        let profile = self.profiles.update(profile).await?;

        if let Some(old) = previous {
            self.uploads.delete_file(&old).await;
        }

        Ok(self.view(&profile))
    }
}
