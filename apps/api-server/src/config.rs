//! Application configuration loaded from environment variables.

use std::env;

#[cfg(feature = "scheduler")]
use chrono::TimeDelta;

use fakebook_infra::database::DatabaseConfig;
use fakebook_infra::{JwtConfig, StorageConfig};

#[cfg(feature = "rate-limit")]
use fakebook_infra::RateLimitConfig;

#[cfg(feature = "scheduler")]
use crate::background::SchedulerConfig;

#[cfg(feature = "scheduler")]
const DEFAULT_DRAFT_RETENTION_HOURS: i64 = 24;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs on in-memory repositories.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[cfg(feature = "scheduler")]
    pub scheduler: SchedulerConfig,
    /// Age after which unused uploads are removed.
    #[cfg(feature = "scheduler")]
    pub draft_retention: TimeDelta,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            storage: StorageConfig::from_env(),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::from_env(),
            #[cfg(feature = "scheduler")]
            scheduler: SchedulerConfig::from_env(),
            #[cfg(feature = "scheduler")]
            draft_retention: TimeDelta::hours(
                env::var("DRAFT_RETENTION_HOURS")
                    .ok()
                    .and_then(|h| h.parse().ok())
                    .filter(|h: &i64| *h > 0)
                    .unwrap_or(DEFAULT_DRAFT_RETENTION_HOURS),
            ),
        }
    }
}
