use reqwest::Client;
use std::time::Duration;

/// Default HTTP client for external calls (recognizer, polish). Per-call timeouts are set
/// by the caller from the relevant config section; this builder only sets connection-level
/// defaults shared by every client.
pub fn new_api_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .expect("Failed to build HTTP client")
}
