//! User configuration.
//!
//! Stored as JSON at `<config dir>/shelfnote/config.json`. Every field has a
//! default, so a partial file (or none at all) is valid.
//!
//! ```json
//! {
//!   "api_key": "sk-ant-...",
//!   "book_template": "Templates/Book.md",
//!   "book_folder": "Books",
//!   "fetch": { "timeout_ms": 8000, "retry": { "max_attempts": 3 } },
//!   "proxies": [{ "kind": "direct" }]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::SourceKind;
use crate::fetch::FetchConfig;
use crate::proxy::{Intermediary, ProxyChain, default_intermediaries};
use crate::summarize::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SUMMARY_ENDPOINT, DEFAULT_SUMMARY_TIMEOUT_MS, Summarizer,
};
use crate::{Result, ShelfnoteError};

const CONFIG_DIR: &str = "shelfnote";
const CONFIG_FILE: &str = "config.json";

/// Settings for one note-creation run. Read-only once the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Anthropic API key. Empty disables summarization.
    pub api_key: String,
    /// Model identifier sent with summarization requests.
    pub model: String,
    pub max_summary_tokens: u32,
    pub summary_endpoint: String,
    /// Time limit for one summarization request, in milliseconds.
    pub summary_timeout_ms: u64,
    /// Whether article notes get a generated summary at all.
    pub summarize_articles: bool,
    /// Root directory that template and folder paths are relative to.
    pub vault: PathBuf,
    pub book_template: PathBuf,
    pub book_folder: PathBuf,
    pub blog_template: PathBuf,
    pub blog_folder: PathBuf,
    pub fetch: FetchConfig,
    /// Intermediaries tried in order when fetching a page.
    pub proxies: Vec<Intermediary>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_summary_tokens: DEFAULT_MAX_TOKENS,
            summary_endpoint: DEFAULT_SUMMARY_ENDPOINT.to_string(),
            summary_timeout_ms: DEFAULT_SUMMARY_TIMEOUT_MS,
            summarize_articles: true,
            vault: PathBuf::from("."),
            book_template: PathBuf::from("Templates/Book.md"),
            book_folder: PathBuf::from("Books"),
            blog_template: PathBuf::from("Templates/Blog.md"),
            blog_folder: PathBuf::from("Blogs"),
            fetch: FetchConfig::default(),
            proxies: default_intermediaries(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Location of the default configuration file, if the platform has a
    /// configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfnoteError::Config`] if the file cannot be read or is
    /// not valid configuration JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ShelfnoteError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&raw)
            .map_err(|e| ShelfnoteError::Config(format!("invalid config {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "config.loaded");
        Ok(config)
    }

    /// Loads the default configuration file, falling back to defaults when
    /// it does not exist.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Vault-relative template path for records of `kind`.
    pub fn template_for(&self, kind: SourceKind) -> &Path {
        match kind {
            SourceKind::Commerce => &self.book_template,
            SourceKind::Article => &self.blog_template,
        }
    }

    /// Vault-relative output folder for records of `kind`.
    pub fn folder_for(&self, kind: SourceKind) -> &Path {
        match kind {
            SourceKind::Commerce => &self.book_folder,
            SourceKind::Article => &self.blog_folder,
        }
    }

    pub fn proxy_chain(&self) -> Result<ProxyChain> {
        ProxyChain::new(self.proxies.clone(), self.fetch.clone())
    }

    pub fn summarizer(&self) -> Result<Summarizer> {
        let client = self.fetch.build_client()?;
        Ok(Summarizer::new(client, &self.api_key, &self.model)
            .with_endpoint(&self.summary_endpoint)
            .with_max_tokens(self.max_summary_tokens)
            .with_timeout(Duration::from_millis(self.summary_timeout_ms)))
    }
}

/// Builder for [`Config`].
///
/// # Example
///
/// ```rust
/// use shelfnote_core::{Config, Intermediary};
///
/// let config = Config::builder()
///     .api_key("sk-test")
///     .vault("/tmp/vault")
///     .proxies(vec![Intermediary::Direct])
///     .build();
/// assert_eq!(config.api_key, "sk-test");
/// assert_eq!(config.proxies.len(), 1);
/// ```
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self { config: Config::default() }
    }

    pub fn api_key(mut self, value: &str) -> Self {
        self.config.api_key = value.to_string();
        self
    }

    pub fn model(mut self, value: &str) -> Self {
        self.config.model = value.to_string();
        self
    }

    pub fn max_summary_tokens(mut self, value: u32) -> Self {
        self.config.max_summary_tokens = value;
        self
    }

    pub fn summary_endpoint(mut self, value: &str) -> Self {
        self.config.summary_endpoint = value.to_string();
        self
    }

    pub fn summary_timeout_ms(mut self, value: u64) -> Self {
        self.config.summary_timeout_ms = value;
        self
    }

    pub fn summarize_articles(mut self, value: bool) -> Self {
        self.config.summarize_articles = value;
        self
    }

    pub fn vault(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.vault = value.into();
        self
    }

    pub fn book_template(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.book_template = value.into();
        self
    }

    pub fn book_folder(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.book_folder = value.into();
        self
    }

    pub fn blog_template(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.blog_template = value.into();
        self
    }

    pub fn blog_folder(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.blog_folder = value.into();
        self
    }

    pub fn fetch(mut self, value: FetchConfig) -> Self {
        self.config.fetch = value;
        self
    }

    pub fn proxies(mut self, value: Vec<Intermediary>) -> Self {
        self.config.proxies = value;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.api_key.is_empty());
        assert!(config.summarize_articles);
        assert_eq!(config.summary_timeout_ms, 60_000);
        assert_eq!(config.proxies.len(), 3);
        assert_eq!(config.template_for(SourceKind::Commerce), Path::new("Templates/Book.md"));
        assert_eq!(config.folder_for(SourceKind::Article), Path::new("Blogs"));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "api_key": "sk-file",
                "book_folder": "Library/Books",
                "fetch": {{ "timeout_ms": 2500, "retry": {{ "max_attempts": 4 }} }},
                "proxies": [{{ "kind": "direct" }}, {{ "kind": "path", "prefix": "https://p.example/fetch/" }}]
            }}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api_key, "sk-file");
        assert_eq!(config.book_folder, PathBuf::from("Library/Books"));
        assert_eq!(config.blog_folder, PathBuf::from("Blogs"));
        assert_eq!(config.fetch.timeout_ms, 2500);
        assert_eq!(config.fetch.retry.max_attempts, 4);
        assert_eq!(config.fetch.retry.base_delay_ms, 500);
        assert_eq!(config.proxies, vec![Intermediary::Direct, Intermediary::path("https://p.example/fetch/")]);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ShelfnoteError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_builder_and_clients() {
        let config =
            Config::builder().api_key("k").model("m").max_summary_tokens(64).summary_timeout_ms(5_000).build();
        assert_eq!(config.model, "m");
        assert_eq!(config.summary_timeout_ms, 5_000);
        assert!(config.summarizer().unwrap().has_api_key());
        assert_eq!(config.proxy_chain().unwrap().intermediaries().len(), 3);
    }
}
