use std::sync::Arc;

use uuid::Uuid;

use crate::db::repositories::{FeedbackRepository, JobRepository};
use crate::error::{AppError, ValidationIssue};
use crate::models::feedback::{Feedback, FeedbackListFilter, FeedbackStatus};

/// C10: human correction feedback loop. Submission is scoped to a job the submitting api
/// key actually owns; status transitions are admin-only and enforced by
/// `FeedbackStatus::can_transition_to` before the repository's own conditional update.
pub struct FeedbackService {
    feedback_repository: Arc<FeedbackRepository>,
    job_repository: Arc<JobRepository>,
}

impl FeedbackService {
    pub fn new(feedback_repository: Arc<FeedbackRepository>, job_repository: Arc<JobRepository>) -> Self {
        Self {
            feedback_repository,
            job_repository,
        }
    }

    pub async fn submit(
        &self,
        job_id: Uuid,
        api_key_id: Uuid,
        corrected_text: &str,
    ) -> Result<Feedback, AppError> {
        let job = self
            .job_repository
            .find_for_owner(job_id, api_key_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", job_id)))?;

        let original_text = job.processed_text.or(job.raw_text).unwrap_or_default();

        if corrected_text.trim().is_empty() {
            return Err(AppError::Validation(vec![ValidationIssue::new(
                "corrected_text",
                "empty",
            )]));
        }

        self.feedback_repository
            .submit(job_id, &original_text, corrected_text)
            .await
    }

    pub async fn list(&self, filter: &FeedbackListFilter) -> Result<Vec<Feedback>, AppError> {
        self.feedback_repository.list(filter).await
    }

    pub async fn update_status(
        &self,
        id: i32,
        target: FeedbackStatus,
        confidence: Option<f64>,
    ) -> Result<Feedback, AppError> {
        let current = self
            .feedback_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Feedback not found: {}", id)))?;

        if !current.status.can_transition_to(target) {
            return Err(AppError::Conflict(format!(
                "cannot transition feedback {} from {} to {}",
                id,
                current.status.as_str(),
                target.as_str()
            )));
        }

        self.feedback_repository
            .transition(id, target, confidence)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "feedback {} was concurrently transitioned out of pending",
                    id
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_allows_approve_and_reject_only() {
        assert!(FeedbackStatus::Pending.can_transition_to(FeedbackStatus::Approved));
        assert!(FeedbackStatus::Pending.can_transition_to(FeedbackStatus::Rejected));
        assert!(!FeedbackStatus::Pending.can_transition_to(FeedbackStatus::AutoApproved));
    }

    #[test]
    fn terminal_states_reject_any_transition() {
        assert!(!FeedbackStatus::Approved.can_transition_to(FeedbackStatus::Rejected));
        assert!(!FeedbackStatus::Rejected.can_transition_to(FeedbackStatus::Approved));
    }
}
