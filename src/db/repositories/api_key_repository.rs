use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::api_key::ApiKey;

pub struct ApiKeyRepository {
    db_pool: PgPool,
}

impl ApiKeyRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Find an active API key by its hash. Enforces `active = true`; revocation is a hard
    /// deactivation, not a soft-deleted row, so there is no expiry to additionally check.
    pub async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let api_key = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, key_hash, is_admin, active, rate_limit, created_at
            FROM api_keys
            WHERE key_hash = $1 AND active
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(api_key)
    }

    pub async fn create_key(
        &self,
        key_hash: &str,
        is_admin: bool,
        rate_limit: Option<i32>,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, key_hash, is_admin, active, rate_limit, created_at)
            VALUES ($1, $2, $3, true, $4, now())
            "#,
        )
        .bind(id)
        .bind(key_hash)
        .bind(is_admin)
        .bind(rate_limit)
        .execute(&self.db_pool)
        .await?;

        Ok(id)
    }

    pub async fn revoke_key(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE api_keys SET active = false WHERE id = $1 AND active"#,
        )
        .bind(id)
        .execute(&self.db_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "API key not found or already revoked: {}",
                id
            )));
        }

        Ok(())
    }
}
