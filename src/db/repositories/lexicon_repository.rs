use sqlx::PgPool;

use crate::error::AppError;
use crate::models::lexicon::LexiconTerm;

pub struct LexiconRepository {
    db_pool: PgPool,
}

impl LexiconRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// All active rows for a lexicon id, used both for serving `GET /lexicons/{id}` and for
    /// compiling the cached view (C4).
    pub async fn list_active(&self, lexicon_id: &str) -> Result<Vec<LexiconTerm>, AppError> {
        let terms = sqlx::query_as::<_, LexiconTerm>(
            r#"
            SELECT id, lexicon_id, term, normalized_term, replacement, active, created_at, updated_at
            FROM lexicon_terms
            WHERE lexicon_id = $1 AND active
            ORDER BY id
            "#,
        )
        .bind(lexicon_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(terms)
    }

    /// Distinct lexicon ids with at least one active term.
    pub async fn list_lexicon_ids(&self) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"SELECT DISTINCT lexicon_id FROM lexicon_terms WHERE active ORDER BY lexicon_id"#,
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn find_active_by_normalized(
        &self,
        lexicon_id: &str,
        normalized_term: &str,
    ) -> Result<Option<LexiconTerm>, AppError> {
        let term = sqlx::query_as::<_, LexiconTerm>(
            r#"
            SELECT id, lexicon_id, term, normalized_term, replacement, active, created_at, updated_at
            FROM lexicon_terms
            WHERE lexicon_id = $1 AND normalized_term = $2 AND active
            "#,
        )
        .bind(lexicon_id)
        .bind(normalized_term)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(term)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<LexiconTerm>, AppError> {
        let term = sqlx::query_as::<_, LexiconTerm>(
            r#"
            SELECT id, lexicon_id, term, normalized_term, replacement, active, created_at, updated_at
            FROM lexicon_terms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(term)
    }

    pub async fn insert(
        &self,
        lexicon_id: &str,
        term: &str,
        normalized_term: &str,
        replacement: &str,
    ) -> Result<LexiconTerm, AppError> {
        let row = sqlx::query_as::<_, LexiconTerm>(
            r#"
            INSERT INTO lexicon_terms (lexicon_id, term, normalized_term, replacement, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, true, now(), now())
            RETURNING id, lexicon_id, term, normalized_term, replacement, active, created_at, updated_at
            "#,
        )
        .bind(lexicon_id)
        .bind(term)
        .bind(normalized_term)
        .bind(replacement)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(row)
    }

    pub async fn update(
        &self,
        id: i32,
        term: &str,
        normalized_term: &str,
        replacement: &str,
    ) -> Result<Option<LexiconTerm>, AppError> {
        let row = sqlx::query_as::<_, LexiconTerm>(
            r#"
            UPDATE lexicon_terms
            SET term = $1, normalized_term = $2, replacement = $3, updated_at = now()
            WHERE id = $4 AND active
            RETURNING id, lexicon_id, term, normalized_term, replacement, active, created_at, updated_at
            "#,
        )
        .bind(term)
        .bind(normalized_term)
        .bind(replacement)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row)
    }

    /// Soft-delete: "deleted" rows are kept for history but excluded from every active query.
    pub async fn soft_delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"UPDATE lexicon_terms SET active = false, updated_at = now() WHERE id = $1 AND active"#,
        )
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
