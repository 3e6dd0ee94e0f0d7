//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod profiles;
mod uploads;
mod users;

use std::sync::Arc;

use actix_web::web;

use fakebook_core::ports::RateLimiter;

use crate::middleware::error::{json_error_handler, query_error_handler};

/// Configure all application routes.
///
/// `limiter`, when given, guards the `/auth` scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Option<Arc<dyn RateLimiter>>) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));

    let auth_scope = web::scope("/auth")
        .route("/register", web::post().to(auth::register))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::post().to(auth::logout))
        .route("/external-providers", web::get().to(auth::external_providers));

    let api = web::scope("/api/v1").route("/health", web::get().to(health::health_check));

    #[cfg(feature = "rate-limit")]
    let api = match limiter {
        Some(limiter) => api.service(
            auth_scope.wrap(crate::middleware::rate_limit::RateLimitMiddleware::new(limiter)),
        ),
        None => api.service(auth_scope),
    };

    #[cfg(not(feature = "rate-limit"))]
    let api = {
        if limiter.is_some() {
            tracing::warn!("Rate limiter ignored: built without the rate-limit feature");
        }
        api.service(auth_scope)
    };

    cfg.service(
        api.route("/users/me", web::get().to(users::me))
            .service(
                web::scope("/admin/users")
                    .route("", web::get().to(users::list))
                    .route("", web::post().to(users::create))
                    .route("/{id}", web::get().to(users::get))
                    .route("/{id}", web::put().to(users::update))
                    .route("/{id}", web::delete().to(users::delete)),
            )
            .service(
                web::scope("/fakebook")
                    .service(
                        web::scope("/profiles")
                            .route("", web::get().to(profiles::list))
                            .route("", web::post().to(profiles::create))
                            .route("/me", web::get().to(profiles::me))
                            .route("/switch/{id}", web::get().to(profiles::switch))
                            .route("/avatar", web::post().to(profiles::avatar))
                            .route("/{id}", web::get().to(profiles::get))
                            .route("/{id}/posts", web::get().to(profiles::posts)),
                    )
                    .service(
                        web::scope("/posts")
                            .route("", web::get().to(posts::timeline))
                            .route("", web::post().to(posts::create))
                            .route("/{id}", web::get().to(posts::get))
                            .route("/{id}", web::put().to(posts::update))
                            .route("/{id}", web::delete().to(posts::delete))
                            .route("/{id}/react", web::post().to(posts::react))
                            .route("/{id}/statistic", web::get().to(posts::statistic))
                            .route("/{id}/comments", web::get().to(posts::comments))
                            .route("/{id}/comments", web::post().to(posts::comment)),
                    )
                    .service(
                        web::scope("/comments")
                            .route("/{id}", web::get().to(comments::get))
                            .route("/{id}", web::put().to(comments::update))
                            .route("/{id}", web::delete().to(comments::delete))
                            .route("/{id}/react", web::post().to(comments::react))
                            .route("/{id}/statistic", web::get().to(comments::statistic)),
                    )
                    .route("/upload", web::post().to(uploads::upload)),
            ),
    );
}
