use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::job::Job;
use crate::models::pipeline_metrics::PipelineMetrics;

pub struct JobRepository {
    db_pool: PgPool,
}

impl JobRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db_pool
    }

    /// `id` is generated by the caller (the submission service) before the audio blob is
    /// written, so the blob's key and the row that references it always agree.
    pub async fn insert_pending(
        &self,
        id: Uuid,
        api_key_id: Uuid,
        lexicon_id: Option<&str>,
        audio_path: &str,
        audio_format: &str,
        language: Option<&str>,
    ) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, api_key_id, lexicon_id, audio_path, audio_format, language, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', now())
            RETURNING id, api_key_id, lexicon_id, audio_path, audio_format, language, status,
                      created_at, started_at, completed_at, raw_text, processed_text,
                      error_reason, correction_count, fuzzy_match_count, confidence_score,
                      confidence_metrics_json
            "#,
        )
        .bind(id)
        .bind(api_key_id)
        .bind(lexicon_id)
        .bind(audio_path)
        .bind(audio_format)
        .bind(language)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(job)
    }

    /// Ownership-scoped read: a job is only visible to the api key that submitted it.
    pub async fn find_for_owner(&self, id: Uuid, api_key_id: Uuid) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, api_key_id, lexicon_id, audio_path, audio_format, language, status,
                   created_at, started_at, completed_at, raw_text, processed_text,
                   error_reason, correction_count, fuzzy_match_count, confidence_score,
                   confidence_metrics_json
            FROM jobs
            WHERE id = $1 AND api_key_id = $2
            "#,
        )
        .bind(id)
        .bind(api_key_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(job)
    }

    /// Pulls the oldest visible PENDING job and atomically marks it PROCESSING in one
    /// statement, so a dequeue can never race with another worker's dequeue of the same row.
    pub async fn claim_next_pending(&self, visibility_timeout: chrono::Duration) -> Result<Option<Job>, AppError> {
        let locked_until = Utc::now() + visibility_timeout;
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = 'processing', started_at = now(), locked_until = $1
            WHERE id = (
                SELECT id FROM jobs
                WHERE status = 'pending' AND (locked_until IS NULL OR locked_until < now())
                ORDER BY created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, api_key_id, lexicon_id, audio_path, audio_format, language, status,
                      created_at, started_at, completed_at, raw_text, processed_text,
                      error_reason, correction_count, fuzzy_match_count, confidence_score,
                      confidence_metrics_json
            "#,
        )
        .bind(locked_until)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(job)
    }

    /// Persists the raw transcript while the job is still PROCESSING, so a crash mid-pipeline
    /// does not lose the recognizer's output.
    pub async fn set_raw_transcript(&self, id: Uuid, raw_text: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"UPDATE jobs SET raw_text = $1 WHERE id = $2 AND status = 'processing'"#,
        )
        .bind(raw_text)
        .bind(id)
        .execute(&self.db_pool)
        .await?;
        Ok(())
    }

    /// Terminal PROCESSING -> COMPLETED conditional update.
    pub async fn complete(
        &self,
        id: Uuid,
        processed_text: &str,
        metrics: &PipelineMetrics,
    ) -> Result<bool, AppError> {
        let metrics_json = serde_json::to_value(metrics)
            .map_err(|e| AppError::Internal(format!("Failed to serialize pipeline metrics: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'completed',
                processed_text = $1,
                confidence_metrics_json = $2,
                confidence_score = $3,
                correction_count = $4,
                fuzzy_match_count = $5,
                completed_at = now(),
                locked_until = NULL
            WHERE id = $6 AND status = 'processing'
            "#,
        )
        .bind(processed_text)
        .bind(metrics_json)
        .bind(metrics.confidence_score)
        .bind(metrics.exact_match_count as i32)
        .bind(metrics.fuzzy_match_count as i32)
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Terminal PROCESSING -> FAILED conditional update.
    pub async fn fail(&self, id: Uuid, reason: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'failed', error_reason = $1, completed_at = now(), locked_until = NULL
            WHERE id = $2 AND status = 'processing'
            "#,
        )
        .bind(reason)
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Orphan-sweep: re-enqueues PENDING rows that have sat unclaimed past the threshold
    /// (e.g. the enqueue signal was lost after the row was inserted). Returns the ids touched.
    pub async fn sweep_stale_pending(&self, older_than: DateTime<Utc>) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM jobs
            WHERE status = 'pending'
              AND created_at < $1
              AND (locked_until IS NULL OR locked_until < now())
            "#,
        )
        .bind(older_than)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Orphan-sweep: moves PROCESSING rows stuck past N times the job timeout to FAILED/STUCK.
    pub async fn sweep_stuck_processing(&self, older_than: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'failed', error_reason = 'STUCK', completed_at = now(), locked_until = NULL
            WHERE status = 'processing' AND started_at < $1
            "#,
        )
        .bind(older_than)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected())
    }
}
