//! Error types for Shelfnote operations.
//!
//! This module defines the main error type [`ShelfnoteError`] which covers
//! fetching, configuration, and note persistence. Extraction itself never
//! produces an error: a missing field degrades to its placeholder value.
//!
//! # Example
//!
//! ```rust
//! use shelfnote_core::{ShelfnoteError, Result};
//!
//! fn check(url: &str) -> Result<()> {
//!     if url.is_empty() {
//!         return Err(ShelfnoteError::InvalidInput("empty URL".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for note creation.
///
/// Network-level variants are recovered inside the proxy chain; only
/// [`ShelfnoteError::FetchFailure`] escapes it once every intermediary is
/// exhausted.
///
/// # Example
///
/// ```rust
/// use shelfnote_core::{ShelfnoteError, validate_url};
///
/// match validate_url("not a url") {
///     Err(ShelfnoteError::InvalidInput(reason)) => println!("rejected: {}", reason),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum ShelfnoteError {
    /// The input failed the minimal URL sanity check.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request errors from reqwest.
    ///
    /// Wraps connection, DNS and body decoding failures for a single attempt.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A single attempt exceeded its time budget and was aborted.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The retry loop was asked to run zero attempts.
    #[error("Retry budget exhausted before any attempt ran")]
    RetriesExhausted,

    /// Every intermediary in the proxy chain failed or returned nothing.
    #[error("Failed to fetch page: {message}")]
    FetchFailure { message: String },

    /// Invalid CSS selector passed to the document helpers.
    #[error("Failed to parse HTML: {0}")]
    HtmlParse(String),

    /// The configured template file could not be read.
    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    /// The configured output folder does not exist.
    #[error("Output folder not found: {0}")]
    FolderNotFound(PathBuf),

    /// A note with the same name already exists.
    #[error("File already exists: {0}")]
    FileExists(PathBuf),

    /// Configuration file errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The invocation was cancelled between stages.
    #[error("Operation cancelled")]
    Cancelled,

    /// File system errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShelfnoteError {
    /// Whether this failure should stop the operation and be shown to the user
    /// as blocking, rather than as a transient notice.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ShelfnoteError::TemplateNotFound(_) | ShelfnoteError::FolderNotFound(_) | ShelfnoteError::FileExists(_)
        )
    }
}

/// Result type alias for ShelfnoteError.
pub type Result<T> = std::result::Result<T, ShelfnoteError>;
