use reqwest::Client;
use std::time::Duration;

/// Build the HTTP client used for model calls, with connection pooling and
/// the caller-configured request timeout (image generation is slow).
pub fn build(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(5)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .expect("Failed to create HTTP client")
}
