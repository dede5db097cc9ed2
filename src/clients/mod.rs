pub mod polish;
pub mod recognizer;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

pub use polish::LargeModelPolishClient;
pub use recognizer::RecognizerClient;

/// Typed errors a transcription or polish call can fail with (spec.md §4.3). The worker
/// classifies these into a job's `FailureReason`; the client itself only decides what is
/// safe to retry.
#[derive(Debug, Clone)]
pub enum ClientError {
    InvalidKey(String),
    FormatRejected(String),
    Quota(String),
    RateLimit {
        retry_after: Option<Duration>,
        message: String,
    },
    Timeout(String),
    Network(String),
    Server5xx(String),
    Unexpected(String),
}

impl ClientError {
    /// TIMEOUT, NETWORK, and SERVER_5XX are retried with backoff; everything else
    /// (including a rate limit beyond its single honored retry) is terminal for the call.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout(_) | ClientError::Network(_) | ClientError::Server5xx(_)
        )
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidKey(m) => write!(f, "invalid API key: {}", m),
            ClientError::FormatRejected(m) => write!(f, "format rejected: {}", m),
            ClientError::Quota(m) => write!(f, "quota exceeded: {}", m),
            ClientError::RateLimit { message, .. } => write!(f, "rate limited: {}", message),
            ClientError::Timeout(m) => write!(f, "timeout: {}", m),
            ClientError::Network(m) => write!(f, "network error: {}", m),
            ClientError::Server5xx(m) => write!(f, "server error: {}", m),
            ClientError::Unexpected(m) => write!(f, "unexpected error: {}", m),
        }
    }
}

impl std::error::Error for ClientError {}

/// Wraps the external speech-recognition API (C8).
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    async fn transcribe(
        &self,
        audio_bytes: &[u8],
        filename: &str,
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<String, ClientError>;
}

/// Wraps the optional large-model polish call (pipeline step 4).
#[async_trait]
pub trait PolishClient: Send + Sync {
    async fn polish(&self, system_prompt: &str, text: &str) -> Result<String, ClientError>;
}
