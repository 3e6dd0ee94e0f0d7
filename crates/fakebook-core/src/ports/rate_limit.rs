//! Rate limiting port. Keys are client addresses.

use async_trait::async_trait;
use std::time::Duration;

/// Admission control for one class of requests (sign-in, registration).
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Consume one unit for `key` and report whether the request may proceed.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;

    /// Forget keys that are back at full capacity. Called periodically.
    fn prune(&self) {}
}

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests left before the key is throttled.
    pub remaining: u32,
    /// When blocked, how long until the next request is admitted.
    pub reset_after: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limiter backend failed: {0}")]
    Backend(String),

    #[error("Invalid rate limit configuration: {0}")]
    Config(String),
}
