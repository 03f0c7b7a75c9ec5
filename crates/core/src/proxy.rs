//! Ordered fallback over CORS intermediaries.
//!
//! Pages are fetched through public proxies because storefronts routinely
//! block direct requests. Intermediaries are tried one at a time in a fixed
//! order and the first non-empty page wins.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::fetch::{FetchConfig, FetchedPage, fetch_with_retry};
use crate::{Result, ShelfnoteError};

/// JSON fields that intermediaries use to wrap the proxied document.
const WRAPPER_FIELDS: &[&str] = &["contents"];

/// How a target URL is wrapped into an intermediary request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Intermediary {
    /// `endpoint?param=<percent-encoded target>`
    Query { endpoint: String, param: String },
    /// `prefix<target>`
    Path { prefix: String },
    /// The target itself, unwrapped.
    Direct,
}

impl Intermediary {
    pub fn query(endpoint: &str, param: &str) -> Self {
        Self::Query { endpoint: endpoint.to_string(), param: param.to_string() }
    }

    pub fn path(prefix: &str) -> Self {
        Self::Path { prefix: prefix.to_string() }
    }

    /// The URL actually requested for `target`.
    ///
    /// ```rust
    /// use shelfnote_core::Intermediary;
    ///
    /// let proxy = Intermediary::query("https://api.allorigins.win/get", "url");
    /// assert_eq!(
    ///     proxy.request_url("https://a.co/d/1?x=y"),
    ///     "https://api.allorigins.win/get?url=https%3A%2F%2Fa.co%2Fd%2F1%3Fx%3Dy"
    /// );
    /// ```
    pub fn request_url(&self, target: &str) -> String {
        match self {
            Intermediary::Query { endpoint, param } => {
                let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
                let separator = if endpoint.contains('?') { '&' } else { '?' };
                format!("{}{}{}={}", endpoint, separator, param, encoded)
            }
            Intermediary::Path { prefix } => format!("{}{}", prefix, target),
            Intermediary::Direct => target.to_string(),
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &str {
        match self {
            Intermediary::Query { endpoint, .. } => endpoint,
            Intermediary::Path { prefix } => prefix,
            Intermediary::Direct => "direct",
        }
    }
}

/// The built-in intermediary list, in the order they are tried.
pub fn default_intermediaries() -> Vec<Intermediary> {
    vec![
        Intermediary::query("https://api.allorigins.win/get", "url"),
        Intermediary::query("https://corsproxy.io/", "url"),
        Intermediary::path("https://thingproxy.freeboard.io/fetch/"),
    ]
}

/// A fetched document and the URL it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub html: String,
    pub origin_url: String,
}

/// Runs `op` over `sources` in order and returns the first success.
///
/// Later sources are never touched once one succeeds. If every source fails
/// the last error is returned; an empty source list yields `Err(None)`.
pub async fn first_success<S, T, E, F, Fut>(
    sources: impl IntoIterator<Item = S>, mut op: F,
) -> std::result::Result<T, Option<E>>
where
    F: FnMut(S) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut last_error = None;
    for source in sources {
        match op(source).await {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error)
}

/// Sequential resolver over a list of intermediaries.
#[derive(Debug, Clone)]
pub struct ProxyChain {
    intermediaries: Vec<Intermediary>,
    fetch: FetchConfig,
    client: Client,
}

impl ProxyChain {
    /// Creates a chain over `intermediaries` with a fresh HTTP client.
    pub fn new(intermediaries: Vec<Intermediary>, fetch: FetchConfig) -> Result<Self> {
        let client = fetch.build_client()?;
        Ok(Self { intermediaries, fetch, client })
    }

    /// Creates a chain over the built-in intermediaries.
    pub fn with_defaults(fetch: FetchConfig) -> Result<Self> {
        Self::new(default_intermediaries(), fetch)
    }

    pub fn intermediaries(&self) -> &[Intermediary] {
        &self.intermediaries
    }

    /// Fetches `target_url` through the first intermediary that yields content.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfnoteError::FetchFailure`] carrying the last recorded
    /// error once every intermediary has been tried.
    pub async fn resolve_html(&self, target_url: &str) -> Result<RawPage> {
        let outcome = first_success(&self.intermediaries, |intermediary| {
            self.try_intermediary(intermediary, target_url)
        })
        .await;

        match outcome {
            Ok(html) => Ok(RawPage { html, origin_url: target_url.to_string() }),
            Err(last) => {
                let message = last.unwrap_or_else(|| "no intermediaries configured".to_string());
                tracing::warn!(target_url, %message, "proxy.exhausted");
                Err(ShelfnoteError::FetchFailure { message })
            }
        }
    }

    async fn try_intermediary(
        &self, intermediary: &Intermediary, target_url: &str,
    ) -> std::result::Result<String, String> {
        let request_url = intermediary.request_url(target_url);
        tracing::debug!(proxy = intermediary.label(), %request_url, "proxy.try");

        let page = fetch_with_retry(&self.client, &request_url, &self.fetch).await.map_err(|e| {
            tracing::debug!(proxy = intermediary.label(), error = %e, "proxy.failed");
            e.to_string()
        })?;

        if !page.is_success() {
            tracing::debug!(proxy = intermediary.label(), status = page.status.as_u16(), "proxy.bad_status");
            return Err(format!("HTTP {} from {}", page.status.as_u16(), intermediary.label()));
        }

        let content = unwrap_content(page);
        if content.trim().is_empty() {
            return Err(format!("empty response from {}", intermediary.label()));
        }

        tracing::debug!(proxy = intermediary.label(), bytes = content.len(), "proxy.resolved");
        Ok(content)
    }
}

/// Extracts the proxied document from a successful response.
///
/// JSON bodies carrying a known wrapper field are unwrapped. A wrapper whose
/// value is `null` or not a string yields empty content. Anything else,
/// including JSON without any wrapper field, is returned as-is.
fn unwrap_content(page: FetchedPage) -> String {
    if page.is_json()
        && let Ok(value) = serde_json::from_str::<serde_json::Value>(&page.body)
        && let Some(wrapped) = WRAPPER_FIELDS.iter().find_map(|field| value.get(*field))
    {
        return wrapped.as_str().map(str::to_string).unwrap_or_default();
    }
    page.body
}
