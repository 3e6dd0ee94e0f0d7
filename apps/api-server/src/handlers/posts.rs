//! Post handlers: timeline, CRUD, reactions and comments under a post.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use fakebook_core::PageRequest;
use fakebook_core::services::{NewMedia, NewPost, PostChanges};
use fakebook_shared::ApiResponse;
use fakebook_shared::dto::{
    CommentRequest, CreatePostRequest, ListQuery, ReactRequest, ReactResponse, UpdatePostRequest,
};

use crate::middleware::error::AppResult;
use crate::middleware::profile::{ActiveProfile, OptionalActiveProfile};
use crate::state::AppState;

/// GET /api/v1/fakebook/posts
pub async fn timeline(
    state: web::Data<AppState>,
    active: ActiveProfile,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::posts(query.before, query.limit);
    let feed = state.posts.timeline(active.profile.profile_id, page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(feed)))
}

/// POST /api/v1/fakebook/posts
pub async fn create(
    state: web::Data<AppState>,
    active: ActiveProfile,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let new = NewPost {
        content: req.content,
        visibility: req.visibility,
        media: req
            .media_items
            .into_iter()
            .map(|m| NewMedia {
                name: m.name,
                path: m.path,
            })
            .collect(),
    };

    let post = state.posts.create(active.profile.profile_id, new).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /api/v1/fakebook/posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    viewer: OptionalActiveProfile,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .get(path.into_inner(), viewer.profile_id())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PUT /api/v1/fakebook/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    active: ActiveProfile,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .update(
            active.profile.profile_id,
            path.into_inner(),
            PostChanges {
                content: req.content,
                visibility: req.visibility,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/v1/fakebook/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    active: ActiveProfile,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(active.profile.profile_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/v1/fakebook/posts/{id}/react
pub async fn react(
    state: web::Data<AppState>,
    active: ActiveProfile,
    path: web::Path<Uuid>,
    body: web::Json<ReactRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .posts
        .react(active.profile.profile_id, path.into_inner(), body.reaction_type)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ReactResponse { outcome })))
}

/// GET /api/v1/fakebook/posts/{id}/statistic
pub async fn statistic(
    state: web::Data<AppState>,
    viewer: OptionalActiveProfile,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let statistic = state
        .posts
        .statistic(path.into_inner(), viewer.profile_id())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(statistic)))
}

/// GET /api/v1/fakebook/posts/{id}/comments
pub async fn comments(
    state: web::Data<AppState>,
    viewer: OptionalActiveProfile,
    path: web::Path<Uuid>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::comments(query.before, query.limit);
    let comments = state
        .comments
        .list(path.into_inner(), viewer.profile_id(), page)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comments)))
}

/// POST /api/v1/fakebook/posts/{id}/comments
pub async fn comment(
    state: web::Data<AppState>,
    active: ActiveProfile,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .create(active.profile.profile_id, path.into_inner(), &body.content)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(comment)))
}
