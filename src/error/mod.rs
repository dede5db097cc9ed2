use actix_web::{HttpResponse, error::ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use sqlx::error::Error as SqlxError;
use std::error::Error as StdError;
use std::fmt;

/// A single structured reason a lexicon mutation or submission was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub issue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Vec<String>>,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            issue: issue.into(),
            value: None,
            chain: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_chain(mut self, chain: Vec<String>) -> Self {
        self.chain = Some(chain);
        self
    }
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Validation(Vec<ValidationIssue>),
    PayloadTooLarge(String),
    TransientExternal(String),
    FatalExternal(String),
    Conflict(String),
    Storage(String),
    Configuration(String),
    TooManyRequests(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(e) => write!(f, "Bad request: {}", e),
            AppError::Unauthorized(e) => write!(f, "Unauthorized: {}", e),
            AppError::Forbidden(e) => write!(f, "Forbidden: {}", e),
            AppError::NotFound(e) => write!(f, "Not found: {}", e),
            AppError::Validation(issues) => write!(
                f,
                "Validation failed: {}",
                issues
                    .iter()
                    .map(|i| i.issue.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            AppError::PayloadTooLarge(e) => write!(f, "Payload too large: {}", e),
            AppError::TransientExternal(e) => write!(f, "Upstream temporarily unavailable: {}", e),
            AppError::FatalExternal(e) => write!(f, "Upstream rejected the request: {}", e),
            AppError::Conflict(e) => write!(f, "Conflict: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::TooManyRequests(e) => write!(f, "Too many requests: {}", e),
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl StdError for AppError {}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            AppError::TransientExternal(_) => {
                (StatusCode::BAD_GATEWAY, "transient_external_error")
            }
            AppError::FatalExternal(_) => (StatusCode::BAD_GATEWAY, "fatal_external_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            AppError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            AppError::TooManyRequests(_) => (StatusCode::TOO_MANY_REQUESTS, "too_many_requests"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Transient-external failures are retried by the calling client; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientExternal(_))
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_type) = self.status_and_type();
        let body = match self {
            AppError::Validation(issues) => serde_json::json!({
                "detail": {
                    "error_type": error_type,
                    "message": self.to_string(),
                    "errors": issues,
                }
            }),
            _ => serde_json::json!({ "detail": self.to_string() }),
        };
        HttpResponse::build(status_code).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.status_and_type().0
    }
}

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        match error {
            SqlxError::RowNotFound => AppError::NotFound("Record not found".to_string()),
            _ => AppError::Internal(format!("Database error: {}", error)),
        }
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(error: actix_multipart::MultipartError) -> Self {
        AppError::BadRequest(format!("Multipart error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Internal(format!(
            "JSON deserialization/serialization error: {}",
            error
        ))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Storage(error.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
