//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod rate_limit;
mod repository;
mod storage;

pub use auth::{AuthError, IssuedToken, PasswordService, TokenClaims, TokenService};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{
    BaseRepository, FeedFilter, FileUploadRepository, PostCommentRepository, PostMediaRepository,
    PostRepository, ProfileRepository, ReactionCount, ReactionRepository, TokenRepository,
    UserExternalRepository, UserRepository,
};
pub use storage::{FileStorage, StorageError};
