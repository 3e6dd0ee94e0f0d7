//! Active profile extractors.
//!
//! The active profile id travels in a cookie and is only trusted after checking
//! that the profile belongs to the authenticated account.

use std::future::Future;
use std::pin::Pin;

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use uuid::Uuid;

use fakebook_core::DomainError;
use fakebook_core::domain::Profile;
use fakebook_core::services::ACTIVE_PROFILE_COOKIE;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppError;
use crate::state::AppState;

const ACTIVE_PROFILE_MAX_AGE_DAYS: i64 = 400;

/// Cookie selecting `profile_id` as the active profile.
pub fn active_profile_cookie(profile_id: Uuid) -> Cookie<'static> {
    Cookie::build(ACTIVE_PROFILE_COOKIE, profile_id.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::days(ACTIVE_PROFILE_MAX_AGE_DAYS))
        .finish()
}

/// Resolved once per request and cached in the request extensions.
#[derive(Clone)]
struct ResolvedProfile(Option<Profile>);

async fn resolve(req: &HttpRequest, identity: &Identity) -> Result<Option<Profile>, AppError> {
    if let Some(resolved) = req.extensions().get::<ResolvedProfile>() {
        return Ok(resolved.0.clone());
    }

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState not found in app data".to_string()))?;

    let cookie = req.cookie(ACTIVE_PROFILE_COOKIE);
    let profile = state
        .profiles
        .resolve_active(identity.user_id, cookie.as_ref().map(|c| c.value()))
        .await?;

    req.extensions_mut().insert(ResolvedProfile(profile.clone()));
    Ok(profile)
}

/// The caller's active profile. Fails with 409 when none is selected.
pub struct ActiveProfile {
    pub identity: Identity,
    pub profile: Profile,
}

impl FromRequest for ActiveProfile {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);
        let req = req.clone();

        Box::pin(async move {
            let identity = identity.await?;
            let profile = resolve(&req, &identity)
                .await?
                .ok_or_else(|| AppError::from(DomainError::NoActiveProfile))?;
            Ok(ActiveProfile { identity, profile })
        })
    }
}

/// Authenticated caller whose active profile may be unset.
///
/// Read endpoints use it to personalize views without requiring a profile.
pub struct OptionalActiveProfile {
    pub identity: Identity,
    pub profile: Option<Profile>,
}

impl OptionalActiveProfile {
    pub fn profile_id(&self) -> Option<Uuid> {
        self.profile.as_ref().map(|p| p.profile_id)
    }
}

impl FromRequest for OptionalActiveProfile {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);
        let req = req.clone();

        Box::pin(async move {
            let identity = identity.await?;
            let profile = resolve(&req, &identity).await?;
            Ok(OptionalActiveProfile { identity, profile })
        })
    }
}
