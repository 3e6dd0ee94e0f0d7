//! Account handlers: the caller's own account and admin user management.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use fakebook_core::services::{RegisterUser, UserChanges};
use fakebook_shared::ApiResponse;
use fakebook_shared::dto::{RegisterRequest, UpdateUserRequest};

use crate::middleware::auth::{Admin, Identity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.users.get(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// GET /api/v1/admin/users
pub async fn list(state: web::Data<AppState>, _admin: Admin) -> AppResult<HttpResponse> {
    let users = state.users.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(users)))
}

/// GET /api/v1/admin/users/{id}
pub async fn get(
    state: web::Data<AppState>,
    _admin: Admin,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state.users.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// POST /api/v1/admin/users
pub async fn create(
    state: web::Data<AppState>,
    admin: Admin,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .users
        .create(RegisterUser {
            email: req.email,
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            birth_date: req.birth_date,
            gender: req.gender,
        })
        .await?;

    tracing::info!(user_id = %user.id, admin_id = %admin.0.user_id, "User created by admin");
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        user,
        "User created successfully.",
    )))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update(
    state: web::Data<AppState>,
    _admin: Admin,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let user = state
        .users
        .update(
            path.into_inner(),
            UserChanges {
                email: req.email,
                username: req.username,
                password: req.password,
                first_name: req.first_name,
                last_name: req.last_name,
                birth_date: req.birth_date,
                gender: req.gender,
                bio: req.bio,
                is_system_admin: req.is_system_admin,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        user,
        "User updated successfully.",
    )))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete(
    state: web::Data<AppState>,
    admin: Admin,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.users.delete(id).await?;

    tracing::info!(user_id = %id, admin_id = %admin.0.user_id, "User deleted by admin");
    Ok(HttpResponse::NoContent().finish())
}
