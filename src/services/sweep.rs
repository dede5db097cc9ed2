use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::settings::QueueConfig;
use crate::db::repositories::JobRepository;
use crate::error::AppError;
use crate::queue::JobQueue;

/// Orphan-sweep (spec.md §4.2): periodically re-enqueues PENDING rows whose enqueue
/// notification was lost, and fails PROCESSING rows stuck well past their job timeout.
pub async fn start(
    job_repository: Arc<JobRepository>,
    queue: Arc<JobQueue>,
    config: QueueConfig,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| AppError::Internal(format!("failed to start sweep scheduler: {}", e)))?;

    let cron = format!("1/{} * * * * *", config.sweep_interval_secs.max(1));
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let job_repository = job_repository.clone();
        let queue = queue.clone();
        let pending_threshold = ChronoDuration::seconds(config.orphan_pending_threshold_secs as i64);
        let stuck_threshold =
            ChronoDuration::seconds((config.job_timeout_secs * config.stuck_timeout_multiplier) as i64);

        Box::pin(async move {
            let pending_cutoff = Utc::now() - pending_threshold;
            match job_repository.sweep_stale_pending(pending_cutoff).await {
                Ok(ids) => {
                    for id in &ids {
                        queue.enqueue(*id);
                    }
                    if !ids.is_empty() {
                        info!("orphan sweep re-enqueued {} stale pending job(s)", ids.len());
                    }
                }
                Err(e) => error!("orphan sweep failed to scan stale pending jobs: {}", e),
            }

            let stuck_cutoff = Utc::now() - stuck_threshold;
            match job_repository.sweep_stuck_processing(stuck_cutoff).await {
                Ok(count) if count > 0 => info!("orphan sweep failed {} stuck processing job(s)", count),
                Ok(_) => {}
                Err(e) => error!("orphan sweep failed to scan stuck processing jobs: {}", e),
            }
        })
    })
    .map_err(|e| AppError::Internal(format!("failed to build sweep job: {}", e)))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| AppError::Internal(format!("failed to register sweep job: {}", e)))?;

    scheduler
        .start()
        .await
        .map_err(|e| AppError::Internal(format!("failed to start sweep scheduler: {}", e)))?;

    Ok(scheduler)
}
