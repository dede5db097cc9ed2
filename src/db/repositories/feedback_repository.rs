use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::feedback::{Feedback, FeedbackListFilter, FeedbackStatus};

pub struct FeedbackRepository {
    db_pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub async fn submit(
        &self,
        job_id: Uuid,
        original_text: &str,
        corrected_text: &str,
    ) -> Result<Feedback, AppError> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (job_id, original_text, corrected_text, status, created_at, updated_at)
            VALUES ($1, $2, $3, 'pending', now(), now())
            RETURNING id, job_id, original_text, corrected_text, status, confidence, created_at, updated_at
            "#,
        )
        .bind(job_id)
        .bind(original_text)
        .bind(corrected_text)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Feedback>, AppError> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, job_id, original_text, corrected_text, status, confidence, created_at, updated_at
            FROM feedback WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row)
    }

    pub async fn list(&self, filter: &FeedbackListFilter) -> Result<Vec<Feedback>, AppError> {
        let rows = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT id, job_id, original_text, corrected_text, status, confidence, created_at, updated_at
            FROM feedback
            WHERE ($1::uuid IS NULL OR job_id = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at <= $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.job_id)
        .bind(filter.status.as_deref())
        .bind(filter.since)
        .bind(filter.until)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows)
    }

    /// Conditional transition, mirroring the worker's conditional job-status updates: only
    /// succeeds if the row is still PENDING, so a concurrent double-approval no-ops rather
    /// than double-applying.
    pub async fn transition(
        &self,
        id: i32,
        target: FeedbackStatus,
        confidence: Option<f64>,
    ) -> Result<Option<Feedback>, AppError> {
        let target_str = target.as_str().replace('-', "_");
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            UPDATE feedback
            SET status = $1, confidence = $2, updated_at = now()
            WHERE id = $3 AND status = 'pending'
            RETURNING id, job_id, original_text, corrected_text, status, confidence, created_at, updated_at
            "#,
        )
        .bind(target_str)
        .bind(confidence)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row)
    }
}
