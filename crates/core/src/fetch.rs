//! Single HTTP fetches with per-attempt timeouts and bounded retry.
//!
//! Status codes are not interpreted here: a 503 is a successful fetch of a
//! 503 page, and deciding what to do with it is the caller's job. Only
//! transport failures and timeouts trigger another attempt.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::{Result, ShelfnoteError};

/// Exponential backoff settings for [`fetch_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2, base_delay_ms: 500, max_delay_ms: 4_000 }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): `min(base * 2^(retry-1), cap)`.
    ///
    /// ```rust
    /// use shelfnote_core::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy { max_attempts: 5, base_delay_ms: 100, max_delay_ms: 300 };
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for(3), Duration::from_millis(300));
    /// ```
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        let millis = self.base_delay_ms.saturating_mul(1u64 << exponent).min(self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

/// HTTP client configuration for fetching pages through intermediaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Retry budget per intermediary.
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: "Mozilla/5.0 (compatible; Shelfnote/0.3)".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builds a reqwest client carrying this configuration's User-Agent.
    pub fn build_client(&self) -> Result<Client> {
        Client::builder()
            .user_agent(self.user_agent.clone())
            .connect_timeout(self.timeout())
            .build()
            .map_err(ShelfnoteError::Http)
    }
}

/// Body and headers of one completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }
}

/// Issues one GET and reads the whole body within `timeout`.
///
/// When the budget runs out the request future is dropped, which aborts the
/// connection, and [`ShelfnoteError::Timeout`] is returned.
pub async fn fetch_once(client: &Client, url: &str, timeout: Duration) -> Result<FetchedPage> {
    let request = async {
        let response = client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.text().await?;

        Ok::<_, reqwest::Error>(FetchedPage { status, content_type, body })
    };

    let timeout_ms = timeout.as_millis() as u64;
    match tokio::time::timeout(timeout, request).await {
        Ok(Ok(page)) => Ok(page),
        Ok(Err(e)) if e.is_timeout() => Err(ShelfnoteError::Timeout { timeout_ms }),
        Ok(Err(e)) => Err(ShelfnoteError::Http(e)),
        Err(_) => Err(ShelfnoteError::Timeout { timeout_ms }),
    }
}

/// Fetches `url`, retrying transport failures according to `config.retry`.
pub async fn fetch_with_retry(client: &Client, url: &str, config: &FetchConfig) -> Result<FetchedPage> {
    let timeout = config.timeout();
    retry_with_backoff(&config.retry, |attempt| {
        tracing::debug!(url, attempt, timeout_ms = config.timeout_ms, "fetch.attempt");
        fetch_once(client, url, timeout)
    })
    .await
}

/// Runs `op` up to `policy.max_attempts` times with exponential backoff
/// between attempts. `op` receives the 1-based attempt number.
///
/// Returns the first success, or the last error once the budget is spent.
/// A zero budget yields [`ShelfnoteError::RetriesExhausted`].
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            let delay = policy.delay_for(attempt - 1);
            tracing::warn!(
                attempt,
                max_attempts = policy.max_attempts,
                backoff_ms = delay.as_millis() as u64,
                error = %last_error.as_ref().map(ToString::to_string).unwrap_or_default(),
                "fetch.retrying"
            );
            sleep(delay).await;
        }

        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or(ShelfnoteError::RetriesExhausted))
}
