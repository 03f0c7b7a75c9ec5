//! URL routing and input detection.
//!
//! Decides whether a URL points at a book listing on a known storefront or
//! at a generic article, and locates URLs inside free text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::{Result, ShelfnoteError};

/// Storefront hosts routed to the commerce extractor, including short-link hosts.
pub const COMMERCE_DOMAINS: &[&str] = &[
    "amazon.com",
    "amazon.co.uk",
    "amazon.co.jp",
    "amazon.de",
    "amazon.fr",
    "amazon.it",
    "amazon.es",
    "amazon.ca",
    "amazon.com.au",
    "amazon.com.br",
    "amazon.com.mx",
    "amazon.in",
    "amazon.nl",
    "a.co",
    "amzn.to",
    "amzn.eu",
    "amzn.asia",
];

/// Maximum distance in bytes between the cursor and a URL span for the URL
/// to count as "under" the cursor.
pub const CURSOR_SLACK: usize = 5;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'()\[\]]+"#).unwrap());

/// Which extractor a page is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Product listing on a known storefront.
    Commerce,
    /// Anything else: blog posts, documentation, news.
    Article,
}

/// A classified URL, ready to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub source_url: String,
    pub source_kind: SourceKind,
}

impl ExtractionRequest {
    /// Classifies `url` and wraps it in a request.
    pub fn new(url: &str) -> Self {
        let source_url = url.trim().to_string();
        let source_kind = classify(&source_url);
        Self { source_url, source_kind }
    }
}

/// Routes a URL to an extractor.
///
/// Never fails: anything without an http(s) scheme or with an unparseable
/// host is treated as an article.
///
/// # Example
///
/// ```rust
/// use shelfnote_core::{SourceKind, classify};
///
/// assert_eq!(classify("https://www.amazon.co.jp/dp/XYZ"), SourceKind::Commerce);
/// assert_eq!(classify("https://myblog.example.com/post/1"), SourceKind::Article);
/// assert_eq!(classify("amazon.com/dp/XYZ"), SourceKind::Article);
/// ```
pub fn classify(url: &str) -> SourceKind {
    let trimmed = url.trim();
    if !has_http_scheme(trimmed) {
        return SourceKind::Article;
    }

    let host = match Url::parse(trimmed) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_ascii_lowercase(),
            None => return SourceKind::Article,
        },
        Err(_) => return SourceKind::Article,
    };

    if COMMERCE_DOMAINS.iter().any(|domain| host_matches(&host, domain)) {
        SourceKind::Commerce
    } else {
        SourceKind::Article
    }
}

/// Minimal sanity check run before the pipeline starts.
///
/// # Errors
///
/// Returns [`ShelfnoteError::InvalidInput`] when the text has no http(s)
/// scheme or no host.
pub fn validate_url(url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ShelfnoteError::InvalidInput("URL is empty".to_string()));
    }
    if !has_http_scheme(trimmed) {
        return Err(ShelfnoteError::InvalidInput(format!(
            "URL must start with http:// or https://: {}",
            trimmed
        )));
    }

    let parsed = Url::parse(trimmed).map_err(|e| ShelfnoteError::InvalidInput(format!("{}: {}", e, trimmed)))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ShelfnoteError::InvalidInput(format!("URL has no host: {}", trimmed))),
    }
}

/// Finds the first URL whose span contains `cursor` or ends within
/// [`CURSOR_SLACK`] bytes of it.
///
/// `cursor` is a byte offset into `text`.
///
/// # Example
///
/// ```rust
/// use shelfnote_core::find_url_near;
///
/// let line = "read this later: https://example.com/post";
/// assert_eq!(find_url_near(line, 20), Some("https://example.com/post"));
/// assert_eq!(find_url_near(line, 0), None);
/// ```
pub fn find_url_near(text: &str, cursor: usize) -> Option<&str> {
    URL_PATTERN
        .find_iter(text)
        .find(|m| {
            let start = m.start().saturating_sub(CURSOR_SLACK);
            let end = m.end().saturating_add(CURSOR_SLACK);
            cursor >= start && cursor <= end
        })
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']))
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.strip_suffix(domain).is_some_and(|rest| rest.ends_with('.'))
}
