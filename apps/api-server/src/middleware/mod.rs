//! Middleware and request extractors.

pub mod auth;
pub mod error;
pub mod profile;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;
