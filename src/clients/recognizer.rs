use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::clients::{ClientError, TranscriptionClient};
use crate::config::settings::RecognizerConfig;

#[derive(Debug, Deserialize)]
struct RecognizerResponse {
    text: String,
}

/// Default HTTP client for the external speech-recognition API (C8). Retries
/// TIMEOUT/NETWORK/SERVER_5XX with exponential backoff and jitter; honors a server-supplied
/// `Retry-After` on 429 for a single extra attempt; never retries INVALID_KEY,
/// FORMAT_REJECTED, or QUOTA.
pub struct RecognizerClient {
    http: Client,
    config: RecognizerConfig,
}

impl RecognizerClient {
    pub fn new(http: Client, config: RecognizerConfig) -> Self {
        Self { http, config }
    }

    #[instrument(skip(self, audio_bytes), fields(filename = %filename, bytes = audio_bytes.len()))]
    async fn call_once(
        &self,
        audio_bytes: &[u8],
        filename: &str,
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<String, ClientError> {
        let url = format!("{}/transcriptions", self.config.base_url);

        let part = Part::bytes(audio_bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| ClientError::FormatRejected(e.to_string()))?;
        let mut form = Form::new().part("file", part);
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let started = Instant::now();
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        let duration = started.elapsed();

        if status.is_success() {
            let parsed: RecognizerResponse = response
                .json()
                .await
                .map_err(|e| ClientError::Unexpected(format!("malformed response body: {}", e)))?;
            info!(
                "recognizer call succeeded: {} bytes, {:?}, {} chars",
                audio_bytes.len(),
                duration,
                parsed.text.len()
            );
            return Ok(parsed.text);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();
        debug!("recognizer call failed after {:?}: {} {}", duration, status, body);

        Err(match status.as_u16() {
            401 | 403 => ClientError::InvalidKey(body),
            400 | 415 | 422 => ClientError::FormatRejected(body),
            402 => ClientError::Quota(body),
            429 => ClientError::RateLimit {
                retry_after,
                message: body,
            },
            500..=599 => ClientError::Server5xx(body),
            _ => ClientError::Unexpected(format!("status {}: {}", status, body)),
        })
    }
}

fn classify_transport_error(err: &reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        ClientError::Network(err.to_string())
    } else {
        ClientError::Unexpected(err.to_string())
    }
}

#[async_trait]
impl TranscriptionClient for RecognizerClient {
    async fn transcribe(
        &self,
        audio_bytes: &[u8],
        filename: &str,
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<String, ClientError> {
        let mut attempt: u32 = 0;
        let mut backoff_ms = self.config.retry_initial_ms;
        let mut rate_limit_retried = false;

        loop {
            match self.call_once(audio_bytes, filename, mime_type, language).await {
                Ok(text) => return Ok(text),
                Err(ClientError::RateLimit { retry_after, message }) if !rate_limit_retried => {
                    rate_limit_retried = true;
                    let wait = retry_after.unwrap_or(Duration::from_secs(1));
                    warn!("recognizer rate limited, retrying once after {:?}: {}", wait, message);
                    tokio::time::sleep(wait).await;
                    continue;
                }
                Err(err) if err.is_retryable() && attempt < self.config.retry_max => {
                    attempt += 1;
                    let jitter_ms = (rand::random::<f64>() * backoff_ms as f64 * 0.25) as u64;
                    let wait = Duration::from_millis(backoff_ms + jitter_ms);
                    warn!(
                        "recognizer call failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.config.retry_max, wait, err
                    );
                    tokio::time::sleep(wait).await;
                    backoff_ms = ((backoff_ms as f64) * self.config.retry_multiplier)
                        .min(self.config.retry_cap_ms as f64) as u64;
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
