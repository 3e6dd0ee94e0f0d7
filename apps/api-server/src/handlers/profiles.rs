//! Profile handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use fakebook_core::PageRequest;
use fakebook_shared::ApiResponse;
use fakebook_shared::dto::{CreateProfileRequest, ListQuery};

use crate::handlers::uploads::read_file;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::middleware::profile::{ActiveProfile, OptionalActiveProfile, active_profile_cookie};
use crate::state::AppState;

/// GET /api/v1/fakebook/profiles
pub async fn list(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let profiles = state.profiles.list(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(profiles)))
}

/// POST /api/v1/fakebook/profiles
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateProfileRequest>,
) -> AppResult<HttpResponse> {
    let profile = state.profiles.create(identity.user_id, &body.name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(profile)))
}

/// GET /api/v1/fakebook/profiles/me
pub async fn me(state: web::Data<AppState>, active: ActiveProfile) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(state.profiles.view(&active.profile))))
}

/// GET /api/v1/fakebook/profiles/switch/{id}
pub async fn switch(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let profile = state
        .profiles
        .switch(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(active_profile_cookie(profile.id))
        .json(ApiResponse::ok(profile)))
}

/// POST /api/v1/fakebook/profiles/avatar
pub async fn avatar(
    state: web::Data<AppState>,
    active: ActiveProfile,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let file = read_file(payload).await?;
    let profile = state.profiles.update_avatar(active.profile, file).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(profile)))
}

/// GET /api/v1/fakebook/profiles/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let profile = state.profiles.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(profile)))
}

/// GET /api/v1/fakebook/profiles/{id}/posts
pub async fn posts(
    state: web::Data<AppState>,
    viewer: OptionalActiveProfile,
    path: web::Path<Uuid>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::posts(query.before, query.limit);
    let feed = state
        .posts
        .profile_feed(path.into_inner(), viewer.profile_id(), page)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(feed)))
}
