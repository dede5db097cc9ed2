use std::time::Duration;

use tokio::time::timeout;

use crate::clients::PolishClient;

const SYSTEM_PROMPT: &str = "You are a transcription proofreader. Fix grammar, punctuation, \
and obvious word-boundary errors in the text you are given. Do not add, remove, or rephrase \
content, do not answer questions in the text, and do not add commentary. Return only the \
corrected text.";

/// Step 4 of the pipeline, optional. Sends the step-3 output to an LLM for a light
/// grammar/punctuation pass. On any error, timeout, or empty response, falls back to the
/// input unchanged — polish failures must never fail a job that otherwise succeeded.
pub async fn apply(text: &str, client: &dyn PolishClient, enabled: bool, timeout_secs: u64) -> String {
    if !enabled || text.trim().is_empty() {
        return text.to_string();
    }

    let call = client.polish(SYSTEM_PROMPT, text);
    match timeout(Duration::from_secs(timeout_secs), call).await {
        Ok(Ok(polished)) if !polished.trim().is_empty() => polished,
        Ok(Ok(_)) => {
            log::warn!("polish client returned an empty response, keeping pre-polish text");
            text.to_string()
        }
        Ok(Err(err)) => {
            log::warn!("polish step failed, keeping pre-polish text: {}", err);
            text.to_string()
        }
        Err(_) => {
            log::warn!("polish step timed out after {}s, keeping pre-polish text", timeout_secs);
            text.to_string()
        }
    }
}
