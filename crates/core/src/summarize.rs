//! Article summarization through the Anthropic Messages API.
//!
//! [`Summarizer::summarize`] never fails. A missing key, a transport error
//! or an error response all turn into a readable string that is written into
//! the note in place of the summary.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::extract::NO_SUMMARY;
use crate::text::truncate_chars;
use crate::{Result, ShelfnoteError};

pub const DEFAULT_SUMMARY_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_SUMMARY_TIMEOUT_MS: u64 = 60_000;

/// Longest article text sent to the API, in characters.
pub const MAX_INPUT_CHARS: usize = 10_000;

/// Returned instead of a summary when no API key is configured.
pub const MISSING_KEY_MESSAGE: &str =
    "No API key configured. Set an Anthropic API key in the configuration to generate summaries.";

const PROMPT_PREFIX: &str = "Summarize the following article in a concise, technical paragraph. \
Focus on the main ideas and any concrete techniques, tools, or results it describes. \
Respond with the summary only.\n\nArticle:\n";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the summarization endpoint.
///
/// # Example
///
/// ```rust
/// use shelfnote_core::Summarizer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let summarizer = Summarizer::new(reqwest::Client::new(), "", "claude-3-5-sonnet-latest");
/// let summary = summarizer.summarize("Some article text").await;
/// assert!(summary.starts_with("No API key configured"));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Summarizer {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
    timeout: Duration,
}

impl Summarizer {
    pub fn new(client: Client, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            endpoint: DEFAULT_SUMMARY_ENDPOINT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_millis(DEFAULT_SUMMARY_TIMEOUT_MS),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Upper bound on a whole summarization request, including the body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Summarizes `text`, degrading to a descriptive string on any failure.
    pub async fn summarize(&self, text: &str) -> String {
        if !self.has_api_key() {
            tracing::debug!("summarize.skipped_no_key");
            return MISSING_KEY_MESSAGE.to_string();
        }

        match self.request_summary(text).await {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                tracing::warn!("summarize.empty_response");
                NO_SUMMARY.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "summarize.failed");
                format!("Summary unavailable: {}", e)
            }
        }
    }

    async fn request_summary(&self, text: &str) -> Result<Option<String>> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message { role: "user", content: build_prompt(text) }],
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "summarize.request");

        let timeout_ms = self.timeout.as_millis() as u64;
        let on_timeout = |e: reqwest::Error| {
            if e.is_timeout() { ShelfnoteError::Timeout { timeout_ms } } else { ShelfnoteError::Http(e) }
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(on_timeout)?;

        let status = response.status();
        let raw = response.text().await.map_err(on_timeout)?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&raw) {
                Ok(payload) => payload.error.message,
                Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
            };
            return Err(ShelfnoteError::FetchFailure { message: format!("HTTP {}: {}", status.as_u16(), message) });
        }

        let parsed: MessagesResponse = serde_json::from_str(&raw)?;
        Ok(first_text_block(parsed))
    }
}

/// The fixed instruction followed by the article text, truncated to
/// [`MAX_INPUT_CHARS`].
pub fn build_prompt(text: &str) -> String {
    format!("{}{}", PROMPT_PREFIX, truncate_chars(text, MAX_INPUT_CHARS))
}

fn first_text_block(response: MessagesResponse) -> Option<String> {
    response
        .content
        .into_iter()
        .find(|block| block.kind.is_empty() || block.kind == "text")
        .and_then(|block| block.text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summarizer(server: &MockServer, key: &str) -> Summarizer {
        Summarizer::new(Client::new(), key, "test-model").with_endpoint(&format!("{}/v1/messages", server.uri()))
    }

    #[tokio::test]
    async fn test_empty_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let summary = summarizer(&server, "   ").summarize("text").await;
        assert_eq!(summary, MISSING_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn test_success_returns_first_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({"model": "test-model", "max_tokens": 256})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "content": [
                    {"type": "text", "text": "  A concise summary.  "},
                    {"type": "text", "text": "ignored"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summary = summarizer(&server, "sk-test").with_max_tokens(256).summarize("Article body").await;
        assert_eq!(summary, "A concise summary.");
    }

    #[tokio::test]
    async fn test_error_payload_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let summary = summarizer(&server, "bad").summarize("text").await;
        assert!(summary.starts_with("Summary unavailable:"), "{}", summary);
        assert!(summary.contains("401"));
        assert!(summary.contains("invalid x-api-key"));
    }

    #[tokio::test]
    async fn test_error_without_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let summary = summarizer(&server, "key").summarize("text").await;
        assert!(summary.starts_with("Summary unavailable:"));
        assert!(summary.contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_missing_content_degrades() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
            .mount(&server)
            .await;

        assert_eq!(summarizer(&server, "key").summarize("text").await, NO_SUMMARY);
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": [{"type": "text", "text": "late"}]}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let summary = summarizer(&server, "key").with_timeout(Duration::from_millis(100)).summarize("text").await;
        assert_eq!(summary, "Summary unavailable: Request timed out after 100 ms");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades() {
        let summarizer = Summarizer::new(Client::new(), "key", "m").with_endpoint("http://127.0.0.1:9/v1/messages");
        let summary = summarizer.summarize("text").await;
        assert!(summary.starts_with("Summary unavailable:"));
    }

    #[test]
    fn test_prompt_is_bounded() {
        let long = "x".repeat(MAX_INPUT_CHARS + 500);
        let prompt = build_prompt(&long);
        assert!(prompt.starts_with(PROMPT_PREFIX));
        assert!(prompt.ends_with("..."));
        assert_eq!(prompt.chars().count(), PROMPT_PREFIX.chars().count() + MAX_INPUT_CHARS + 3);

        let short = build_prompt("short text");
        assert!(short.ends_with("short text"));
    }
}
