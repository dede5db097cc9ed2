use crate::config::settings::DatabaseConfig;
use crate::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Creates the single PostgreSQL connection pool used by the whole service.
/// This service has no per-role RLS separation (see DESIGN.md); every repository
/// shares one pool.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    log::info!("Creating database connection pool");

    let max_retries = 3;
    let mut last_error = None;

    for attempt in 1..=max_retries {
        log::info!("Database pool connection attempt {} of {}", attempt, max_retries);

        match PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .test_before_acquire(true)
            .connect(&config.url)
            .await
        {
            Ok(pool) => {
                log::info!(
                    "Connected to database (max: {}, min: {}, acquire_timeout: {}ms)",
                    config.max_connections,
                    config.min_connections,
                    config.acquire_timeout_ms
                );
                return Ok(pool);
            }
            Err(e) => {
                log::warn!("Database pool connection attempt {} failed: {}", attempt, e);
                last_error = Some(e);
                if attempt < max_retries {
                    let delay = Duration::from_secs(2 * attempt as u64);
                    log::info!("Retrying in {} seconds...", delay.as_secs());
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    let error = last_error.unwrap_or_else(|| {
        sqlx::Error::Configuration("Unknown database connection error".into())
    });
    log::error!("All database pool connection attempts failed: {}", error);
    Err(AppError::Internal(format!("Failed to connect to database: {}", error)))
}

/// Verifies the database connection by executing a simple query. Used for health checks
/// and startup readiness.
pub async fn verify_connection(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query_as::<_, (i32,)>("SELECT 1")
        .fetch_optional(pool)
        .await
        .map(|_| {
            log::debug!("Database connection verified");
        })
        .map_err(|e| {
            log::error!("Database connection verification failed: {}", e);
            AppError::Internal(format!("Database connection verification failed: {}", e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[tokio::test]
    async fn test_verify_connection() {
        if let Ok(url) = env::var("DATABASE_URL") {
            let config = DatabaseConfig {
                url,
                max_connections: 2,
                min_connections: 1,
                acquire_timeout_ms: 2000,
            };
            if let Ok(pool) = create_pool(&config).await {
                let _result = verify_connection(&pool).await;
            }
        }
    }
}
