use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An API key record. Authentication is API-key only in this service; there is no JWT.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,
    pub key_hash: String,
    pub is_admin: bool,
    pub active: bool,
    pub rate_limit: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Identity attached to an authenticated request's extensions by the API-key middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedApiKey {
    pub api_key_id: Uuid,
    pub is_admin: bool,
    pub rate_limit: Option<i32>,
}
