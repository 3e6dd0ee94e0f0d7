//! Authentication handlers.

use actix_web::{HttpResponse, web};

use fakebook_core::services::RegisterUser;
use fakebook_core::views::UserView;
use fakebook_shared::ApiResponse;
use fakebook_shared::dto::{AuthResponse, LoginRequest, ProviderResponse, RegisterRequest};

use crate::middleware::auth::{Identity, clear_session_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .auth
        .register(RegisterUser {
            email: req.email,
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            birth_date: req.birth_date,
            gender: req.gender,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        UserView::from(&user),
        "Registration successful",
    )))
}

/// POST /api/v1/auth/login
///
/// The token is returned in the body and also set as an `HttpOnly` cookie.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.auth.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&session.token, session.expires_in))
        .json(ApiResponse::ok(AuthResponse {
            access_token: session.token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
            expires_at: session.expires_at,
            user: UserView::from(&session.user),
        })))
}

/// POST /api/v1/auth/logout
pub async fn logout(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state.auth.logout(identity.token_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(clear_session_cookie())
        .json(ApiResponse::message("Logged out")))
}

/// GET /api/v1/auth/external-providers
pub async fn external_providers(state: web::Data<AppState>) -> HttpResponse {
    let providers: Vec<ProviderResponse> = state
        .auth
        .providers()
        .iter()
        .map(|p| ProviderResponse {
            code: p.code(),
            name: p.name().to_string(),
        })
        .collect();

    HttpResponse::Ok().json(ApiResponse::ok(providers))
}
