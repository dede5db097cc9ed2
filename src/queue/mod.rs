use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::db::repositories::JobRepository;
use crate::error::AppError;
use crate::models::job::Job;

/// FIFO-ish work queue keyed by job id (C5). Dequeue visibility is enforced in the database
/// via a conditional `status='pending' -> 'processing'` update guarded by `locked_until`
/// (see `JobRepository::claim_next_pending`); the `Notify` here only avoids idle polling
/// when a worker is waiting and a submission just enqueued a job in the same process.
pub struct JobQueue {
    job_repository: Arc<JobRepository>,
    notify: Notify,
    visibility_timeout: ChronoDuration,
    poll_interval: Duration,
}

impl JobQueue {
    pub fn new(
        job_repository: Arc<JobRepository>,
        visibility_timeout_secs: u64,
        poll_interval_secs: u64,
    ) -> Self {
        Self {
            job_repository,
            notify: Notify::new(),
            visibility_timeout: ChronoDuration::seconds(visibility_timeout_secs as i64),
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
        }
    }

    /// Called by the submission service right after the PENDING row commits. Wakes one
    /// idle worker routine; if none is waiting this is a no-op (the row is still visible
    /// to the next poll or to the orphan sweep).
    pub fn enqueue(&self, _job_id: Uuid) {
        self.notify.notify_one();
    }

    /// Blocks the calling worker routine until a job becomes claimable, then claims and
    /// returns it. Retries on a fixed poll interval between notifications so a missed
    /// wake-up (e.g. the notify fired before this routine started waiting) cannot wedge
    /// a worker forever.
    pub async fn dequeue(&self) -> Result<Job, AppError> {
        loop {
            if let Some(job) = self.job_repository.claim_next_pending(self.visibility_timeout).await? {
                return Ok(job);
            }

            let wait = self.notify.notified();
            tokio::select! {
                _ = wait => {}
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_without_waiters_does_not_panic() {
        // Notify::notify_one with no waiters is a documented no-op permit, not an error.
        let notify = Notify::new();
        notify.notify_one();
    }
}
