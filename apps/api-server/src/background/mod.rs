//! Periodic maintenance jobs.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig};

use std::sync::Arc;

use chrono::TimeDelta;
use tokio_cron_scheduler::JobSchedulerError;

use fakebook_core::ports::RateLimiter;

use crate::state::AppState;

/// Build a scheduler carrying the maintenance jobs. Call `start` once every job is added.
///
/// Jobs: removal of uploads that stayed drafts longer than `draft_retention`
/// and purge of expired sessions.
pub async fn maintenance_scheduler(
    config: SchedulerConfig,
    state: &AppState,
    draft_retention: TimeDelta,
) -> Result<Scheduler, JobSchedulerError> {
    let schedule = config.maintenance_cron.clone();
    let scheduler = Scheduler::new(config).await?;

    let uploads = state.uploads.clone();
    scheduler
        .add_cron("draft-cleanup", &schedule, move || {
            let uploads = uploads.clone();
            async move {
                match uploads.cleanup_drafts(draft_retention).await {
                    Ok(0) => tracing::debug!("No stale drafts"),
                    Ok(removed) => tracing::info!(removed, "Stale drafts removed"),
                    Err(e) => tracing::error!(error = %e, "Draft cleanup failed"),
                }
            }
        })
        .await?;

    let auth = state.auth.clone();
    scheduler
        .add_cron("session-purge", &schedule, move || {
            let auth = Arc::clone(&auth);
            async move {
                match auth.purge_expired_tokens().await {
                    Ok(purged) => tracing::debug!(purged, "Expired sessions purged"),
                    Err(e) => tracing::error!(error = %e, "Session purge failed"),
                }
            }
        })
        .await?;

    Ok(scheduler)
}

/// Drop idle rate limiter keys on the maintenance schedule.
pub async fn prune_rate_limiter(
    scheduler: &Scheduler,
    limiter: Arc<dyn RateLimiter>,
) -> Result<(), JobSchedulerError> {
    scheduler
        .add_cron("rate-limit-prune", scheduler.maintenance_cron(), move || {
            let limiter = limiter.clone();
            async move { limiter.prune() }
        })
        .await?;
    Ok(())
}
