//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use fakebook_shared::ApiResponse;
use fakebook_shared::dto::{CommentRequest, ReactRequest, ReactResponse};

use crate::middleware::error::AppResult;
use crate::middleware::profile::{ActiveProfile, OptionalActiveProfile};
use crate::state::AppState;

/// GET /api/v1/fakebook/comments/{id}
pub async fn get(
    state: web::Data<AppState>,
    viewer: OptionalActiveProfile,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .get(path.into_inner(), viewer.profile_id())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// PUT /api/v1/fakebook/comments/{id}
pub async fn update(
    state: web::Data<AppState>,
    active: ActiveProfile,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .update(active.profile.profile_id, path.into_inner(), &body.content)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// DELETE /api/v1/fakebook/comments/{id}
pub async fn delete(
    state: web::Data<AppState>,
    active: ActiveProfile,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .comments
        .delete(active.profile.profile_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/v1/fakebook/comments/{id}/react
pub async fn react(
    state: web::Data<AppState>,
    active: ActiveProfile,
    path: web::Path<Uuid>,
    body: web::Json<ReactRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .comments
        .react(active.profile.profile_id, path.into_inner(), body.reaction_type)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ReactResponse { outcome })))
}

/// GET /api/v1/fakebook/comments/{id}/statistic
pub async fn statistic(
    state: web::Data<AppState>,
    viewer: OptionalActiveProfile,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let statistic = state
        .comments
        .statistic(path.into_inner(), viewer.profile_id())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(statistic)))
}
