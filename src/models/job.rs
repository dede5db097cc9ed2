use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::pipeline_metrics::PipelineMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// Typed failure reasons a worker can record against a terminally FAILED job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    QuotaExceeded,
    RecognizerError,
    AudioDecode,
    MissingAudio,
    Stuck,
    Internal,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::QuotaExceeded => "QUOTA_EXCEEDED",
            FailureReason::RecognizerError => "RECOGNIZER_ERROR",
            FailureReason::AudioDecode => "AUDIO_DECODE",
            FailureReason::MissingAudio => "MISSING_AUDIO",
            FailureReason::Stuck => "STUCK",
            FailureReason::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A durable transcription job record. Mutated only by the worker, via conditional updates
/// that enforce the PENDING -> PROCESSING -> {COMPLETED, FAILED} monotonic chain.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub api_key_id: Uuid,
    pub lexicon_id: Option<String>,
    pub audio_path: String,
    pub audio_format: String,
    pub language: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub raw_text: Option<String>,
    pub processed_text: Option<String>,
    pub error_reason: Option<String>,
    pub correction_count: Option<i32>,
    pub fuzzy_match_count: Option<i32>,
    pub confidence_score: Option<f64>,
    pub confidence_metrics_json: Option<serde_json::Value>,
}

impl Job {
    pub fn metrics(&self) -> Option<PipelineMetrics> {
        self.confidence_metrics_json
            .clone()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

/// Wire representation of a job returned to polling clients (spec.md §6).
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub job_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy_match_count: Option<i32>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        JobView {
            job_id: job.id,
            status: job.status.as_str().to_string(),
            created_at: job.created_at,
            completed_at: job.completed_at,
            original_text: job.raw_text,
            processed_text: job.processed_text,
            error: job.error_reason,
            confidence_score: job.confidence_score,
            correction_count: job.correction_count,
            fuzzy_match_count: job.fuzzy_match_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobCreatedView {
    pub job_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
