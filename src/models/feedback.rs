use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum FeedbackStatus {
    Pending,
    Approved,
    Rejected,
    #[sqlx(rename = "auto_approved")]
    #[serde(rename = "auto-approved")]
    AutoApproved,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Approved => "approved",
            FeedbackStatus::Rejected => "rejected",
            FeedbackStatus::AutoApproved => "auto-approved",
        }
    }

    /// Only PENDING -> APPROVED and PENDING -> REJECTED are legal; everything else,
    /// including any transition out of a terminal state, is an invalid transition.
    pub fn can_transition_to(&self, target: FeedbackStatus) -> bool {
        matches!(
            (self, target),
            (FeedbackStatus::Pending, FeedbackStatus::Approved)
                | (FeedbackStatus::Pending, FeedbackStatus::Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, FeedbackStatus::Pending)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Feedback {
    pub id: i32,
    pub job_id: Uuid,
    pub original_text: String,
    pub corrected_text: String,
    pub status: FeedbackStatus,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub corrected_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFeedbackStatusRequest {
    pub status: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackView {
    pub id: i32,
    pub job_id: Uuid,
    pub original_text: String,
    pub corrected_text: String,
    pub status: String,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackView {
    fn from(f: Feedback) -> Self {
        FeedbackView {
            id: f.id,
            job_id: f.job_id,
            original_text: f.original_text,
            corrected_text: f.corrected_text,
            status: f.status.as_str().to_string(),
            confidence: f.confidence,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeedbackListFilter {
    pub job_id: Option<Uuid>,
    pub status: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    #[serde(default = "default_page_size")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_page_size() -> i64 {
    50
}
