//! Application state - shared across all handlers.

use std::sync::Arc;

use fakebook_core::ports::{
    FileStorage, FileUploadRepository, PasswordService, PostCommentRepository,
    PostMediaRepository, PostRepository, ProfileRepository, ReactionRepository, TokenRepository,
    TokenService, UserExternalRepository, UserRepository,
};
use fakebook_core::services::{
    AuthService, CommentService, FeedAssembler, PostService, ProfileService, ReactionService,
    UploadService, UserService,
};
use fakebook_infra::{
    Argon2PasswordService, InMemoryStore, JwtTokenService, LocalFileStorage,
};

#[cfg(feature = "postgres")]
use fakebook_infra::database::{PostgresRepositories, connect};

use crate::config::AppConfig;

/// One handle per repository port.
pub struct Repositories {
    /// Backend name reported by the health check.
    pub kind: &'static str,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub externals: Arc<dyn UserExternalRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub media: Arc<dyn PostMediaRepository>,
    pub comments: Arc<dyn PostCommentRepository>,
    pub reactions: Arc<dyn ReactionRepository>,
    pub uploads: Arc<dyn FileUploadRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            kind: "memory",
            users: store.clone(),
            tokens: store.clone(),
            externals: store.clone(),
            profiles: store.clone(),
            posts: store.clone(),
            media: store.clone(),
            comments: store.clone(),
            reactions: store.clone(),
            uploads: store,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(repos: PostgresRepositories) -> Self {
        Self {
            kind: "postgres",
            users: repos.users,
            tokens: repos.tokens,
            externals: repos.externals,
            profiles: repos.profiles,
            posts: repos.posts,
            media: repos.media,
            comments: repos.comments,
            reactions: repos.reactions,
            uploads: repos.uploads,
        }
    }

    /// Postgres when configured and reachable, otherwise in-memory.
    pub async fn from_config(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            let Some(db_config) = config.database.as_ref() else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                return Self::in_memory();
            };

            match connect(db_config).await {
                Ok(conn) => Self::postgres(PostgresRepositories::new(conn)),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory()
                }
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            if config.database.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            Self::in_memory()
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub database: &'static str,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub profiles: Arc<ProfileService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub uploads: Arc<UploadService>,
}

impl AppState {
    /// Build the application state from configuration.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Repositories::from_config(config).await;
        let storage = Arc::new(LocalFileStorage::new(config.storage.clone()));
        let state = Self::build(
            repos,
            storage,
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(config.jwt.clone())),
        );

        tracing::info!("Application state initialized");
        state
    }

    /// Wire the services over the given infrastructure.
    pub fn build(
        repos: Repositories,
        storage: Arc<dyn FileStorage>,
        passwords: Arc<dyn PasswordService>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        let uploads = Arc::new(UploadService::new(storage.clone(), repos.uploads));
        let reactions = Arc::new(ReactionService::new(repos.reactions));
        let feed = Arc::new(FeedAssembler::new(
            repos.profiles.clone(),
            repos.media,
            repos.comments.clone(),
            reactions.clone(),
            storage,
        ));
        let posts = Arc::new(PostService::new(
            repos.posts,
            repos.comments.clone(),
            reactions.clone(),
            feed.clone(),
            uploads.clone(),
        ));

        Self {
            database: repos.kind,
            auth: Arc::new(AuthService::new(
                repos.users.clone(),
                repos.tokens,
                repos.externals,
                passwords.clone(),
                token_service,
            )),
            users: Arc::new(UserService::new(repos.users, passwords)),
            profiles: Arc::new(ProfileService::new(repos.profiles, uploads.clone())),
            comments: Arc::new(CommentService::new(
                repos.comments,
                posts.clone(),
                reactions,
                feed,
            )),
            posts,
            uploads,
        }
    }
}
