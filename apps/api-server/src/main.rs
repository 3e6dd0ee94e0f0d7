//! # Fakebook API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use fakebook_core::ports::RateLimiter;

#[cfg(feature = "rate-limit")]
use fakebook_infra::InMemoryRateLimiter;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Fakebook API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await;

    #[cfg(feature = "rate-limit")]
    let limiter: Option<Arc<dyn RateLimiter>> =
        match InMemoryRateLimiter::new(config.rate_limit.clone()) {
            Ok(limiter) => Some(Arc::new(limiter)),
            Err(e) => {
                tracing::error!("Rate limiter disabled: {}", e);
                None
            }
        };

    #[cfg(not(feature = "rate-limit"))]
    let limiter: Option<Arc<dyn RateLimiter>> = None;

    #[cfg(feature = "scheduler")]
    let _scheduler = start_scheduler(&config, &state, limiter.clone()).await;

    HttpServer::new(move || {
        let limiter = limiter.clone();
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Maintenance jobs. A scheduler failure is logged and the server runs without it.
#[cfg(feature = "scheduler")]
async fn start_scheduler(
    config: &AppConfig,
    state: &AppState,
    limiter: Option<Arc<dyn RateLimiter>>,
) -> Option<background::Scheduler> {
    let result = async {
        let scheduler = background::maintenance_scheduler(
            config.scheduler.clone(),
            state,
            config.draft_retention,
        )
        .await?;
        if let Some(limiter) = limiter {
            background::prune_rate_limiter(&scheduler, limiter).await?;
        }
        scheduler.start().await?;
        Ok::<_, tokio_cron_scheduler::JobSchedulerError>(scheduler)
    }
    .await;

    match result {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            tracing::error!("Scheduler failed to start: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use actix_web::cookie::Cookie;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test, web};
    use serde_json::{Value, json};
    use uuid::Uuid;

    use fakebook_core::services::ACTIVE_PROFILE_COOKIE;
    use fakebook_infra::{
        Argon2PasswordService, JwtConfig, JwtTokenService, LocalFileStorage, StorageConfig,
    };
    use fakebook_shared::ApiResponse;
    use fakebook_shared::dto::AuthResponse;

    use crate::handlers;
    use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
    use crate::state::{AppState, Repositories};

    struct TestDir(PathBuf);

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn test_state() -> (AppState, TestDir) {
        let dir = std::env::temp_dir().join(format!("fakebook-api-{}", Uuid::new_v4()));
        let storage = LocalFileStorage::new(StorageConfig {
            dir_path: dir.clone(),
            base_url: "http://cdn.test".to_string(),
            base_path: "files".to_string(),
        });
        let state = AppState::build(
            Repositories::in_memory(),
            Arc::new(storage),
            Arc::new(Argon2PasswordService::with_params(8 * 1024, 1, 1).unwrap()),
            Arc::new(JwtTokenService::new(JwtConfig::default())),
        );
        (state, TestDir(dir))
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(|cfg| handlers::configure_routes(cfg, None)),
            )
            .await
        };
    }

    /// Register an account and return a fresh access token.
    macro_rules! login {
        ($app:expr, $email:expr, $username:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(register_body($email, $username))
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);

            let req = test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({"email": $email, "password": "secret1"}))
                .to_request();
            let body: ApiResponse<AuthResponse> = test::call_and_read_body_json(&$app, req).await;
            body.data.unwrap().access_token
        }};
    }

    fn register_body(email: &str, username: &str) -> Value {
        json!({
            "email": email,
            "username": username,
            "password": "secret1",
            "first_name": "Jane",
            "last_name": "Doe",
            "birth_date": "1990-05-17",
            "gender": "female"
        })
    }

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_health() {
        let (state, _dir) = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "memory");
    }

    #[actix_web::test]
    async fn test_register_and_login_flow() {
        let (state, _dir) = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body("Jane@Example.com", "jane"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body("jane@example.com", "jane2"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "jane@example.com", "password": "wrong-pass"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "jane@example.com", "password": "secret1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_string());
        let body: ApiResponse<AuthResponse> = test::read_body_json(resp).await;
        let auth = body.data.unwrap();
        assert_eq!(cookie.as_deref(), Some(auth.access_token.as_str()));
        assert_eq!(auth.user.email, "jane@example.com");

        // The cookie alone authenticates.
        let req = test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, auth.access_token.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["username"], "jane");
        assert_eq!(body["data"]["avatar"], "avatar/women.png");
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let (state, _dir) = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::get().uri("/api/v1/users/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/v1/fakebook/posts")
            .insert_header(bearer("not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_logout_revokes_token() {
        let (state, _dir) = test_state();
        let app = init_app!(state);
        let token = login!(app, "bob@example.com", "bob");

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_string());
        assert_eq!(cleared.as_deref(), Some(""));

        let req = test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["title"], "Token Revoked");
    }

    #[actix_web::test]
    async fn test_admin_routes_require_admin_role() {
        let (state, _dir) = test_state();
        let app = init_app!(state);
        let token = login!(app, "eve@example.com", "eve");

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/users")
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/admin/users")
            .insert_header(bearer(&token))
            .set_json(json!({
                "email": "mallory@example.com",
                "username": "mallory",
                "password": "secret1",
                "first_name": "Mal",
                "last_name": "Lory",
                "birth_date": "1990-01-01"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/admin/users/{}", uuid::Uuid::new_v4()))
            .insert_header(bearer(&token))
            .set_json(json!({ "is_system_admin": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_malformed_json_names_the_path() {
        let (state, _dir) = test_state();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["instance"], "/api/v1/auth/login");
    }

    #[actix_web::test]
    async fn test_profile_post_and_reaction_flow() {
        let (state, _dir) = test_state();
        let app = init_app!(state);
        let token = login!(app, "ann@example.com", "ann");

        let req = test::TestRequest::post()
            .uri("/api/v1/fakebook/profiles")
            .insert_header(bearer(&token))
            .set_json(json!({"name": "Ann"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let profile_id = body["data"]["id"].as_str().unwrap().to_string();

        // No active profile yet.
        let req = test::TestRequest::get()
            .uri("/api/v1/fakebook/posts")
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/fakebook/profiles/switch/{profile_id}"))
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let active = resp
            .response()
            .cookies()
            .find(|c| c.name() == ACTIVE_PROFILE_COOKIE)
            .map(|c| c.value().to_string());
        assert_eq!(active.as_deref(), Some(profile_id.as_str()));
        let active_cookie = Cookie::new(ACTIVE_PROFILE_COOKIE, profile_id.clone());

        let req = test::TestRequest::post()
            .uri("/api/v1/fakebook/posts")
            .insert_header(bearer(&token))
            .cookie(active_cookie.clone())
            .set_json(json!({"content": "hello world", "visibility": "public"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let post_id = body["data"]["id"].as_str().unwrap().to_string();

        let react = |reaction: &str| {
            test::TestRequest::post()
                .uri(&format!("/api/v1/fakebook/posts/{post_id}/react"))
                .insert_header(bearer(&token))
                .cookie(active_cookie.clone())
                .set_json(json!({"type": reaction}))
                .to_request()
        };
        let body: Value = test::call_and_read_body_json(&app, react("UpVote")).await;
        assert_eq!(body["data"]["outcome"], "added");

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/fakebook/posts/{post_id}/comments"))
            .insert_header(bearer(&token))
            .cookie(active_cookie.clone())
            .set_json(json!({"content": "first"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/v1/fakebook/posts?limit=5")
            .insert_header(bearer(&token))
            .cookie(active_cookie.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["content"], "hello world");
        assert_eq!(items[0]["reaction"], "UpVote");
        assert_eq!(items[0]["statistic"]["comment"], 1);
        assert_eq!(items[0]["statistic"]["reactions"]["upvote"], 1);
        assert_eq!(items[0]["creator"]["name"], "Ann");

        let body: Value = test::call_and_read_body_json(&app, react("UpVote")).await;
        assert_eq!(body["data"]["outcome"], "removed");

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/fakebook/posts/{post_id}/statistic"))
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["reactions"]["total"], 0);
    }

    #[actix_web::test]
    async fn test_switch_to_foreign_profile_is_forbidden() {
        let (state, _dir) = test_state();
        let app = init_app!(state);
        let owner = login!(app, "owner@example.com", "owner");
        let other = login!(app, "other@example.com", "other");

        let req = test::TestRequest::post()
            .uri("/api/v1/fakebook/profiles")
            .insert_header(bearer(&owner))
            .set_json(json!({"name": "Owner"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let profile_id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/fakebook/profiles/switch/{profile_id}"))
            .insert_header(bearer(&other))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // A forged cookie does not select someone else's profile either.
        let req = test::TestRequest::get()
            .uri("/api/v1/fakebook/profiles/me")
            .insert_header(bearer(&other))
            .cookie(Cookie::new(ACTIVE_PROFILE_COOKIE, profile_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
