use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::clients::{ClientError, PolishClient};
use crate::config::settings::PolishConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// HTTP client for the optional large-model polish step (pipeline step 4). Makes a single
/// chat-completion-style call with no internal retry: the pipeline already falls back to
/// the pre-polish text on any error, so a retry loop here would only delay that fallback.
pub struct LargeModelPolishClient {
    http: Client,
    config: PolishConfig,
}

impl LargeModelPolishClient {
    pub fn new(http: Client, config: PolishConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl PolishClient for LargeModelPolishClient {
    #[instrument(skip(self, system_prompt, text), fields(chars = text.len()))]
    async fn polish(&self, system_prompt: &str, text: &str) -> Result<String, ClientError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(e.to_string())
                } else {
                    ClientError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => ClientError::InvalidKey(body),
                429 => ClientError::RateLimit {
                    retry_after: None,
                    message: body,
                },
                500..=599 => ClientError::Server5xx(body),
                _ => ClientError::Unexpected(format!("status {}: {}", status, body)),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Unexpected(format!("malformed polish response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClientError::Unexpected("polish response had no choices".to_string()))
    }
}
