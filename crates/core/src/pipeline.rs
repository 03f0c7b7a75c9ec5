//! End-to-end note creation: classify, fetch, extract, summarize, render and
//! persist.
//!
//! Stages run strictly in sequence. Template and output folder are checked
//! through the host before any network call, so a misconfigured vault fails
//! fast. The cancellation token is checked between stages and raced against
//! every network call; once it fires nothing further is sent.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::classify::{ExtractionRequest, SourceKind, validate_url};
use crate::config::Config;
use crate::extract::{ArticleContent, ArticleRecord, ExtractedRecord, NO_SUMMARY, PageContent, extract_page};
use crate::host::NoteHost;
use crate::proxy::{ProxyChain, RawPage};
use crate::render::{render, sanitize_file_name};
use crate::summarize::Summarizer;
use crate::{Result, ShelfnoteError};

/// A note written to the host, with the record it was rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedNote {
    /// Host-relative path of the new note.
    pub path: PathBuf,
    pub record: ExtractedRecord,
}

/// Template text and destination folder, verified to exist.
struct Destination {
    template: String,
    folder: PathBuf,
}

/// Runs the note pipeline against a [`NoteHost`].
pub struct NoteCreator<H> {
    config: Config,
    host: H,
    chain: ProxyChain,
    summarizer: Summarizer,
}

impl<H: NoteHost> NoteCreator<H> {
    /// Builds HTTP clients from `config`.
    pub fn new(config: Config, host: H) -> Result<Self> {
        let chain = config.proxy_chain()?;
        let summarizer = config.summarizer()?;
        Ok(Self { config, host, chain, summarizer })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Fetches and extracts `url` without writing anything.
    pub async fn extract(&self, url: &str) -> Result<ExtractedRecord> {
        validate_url(url)?;
        let request = ExtractionRequest::new(url);
        let page = self.chain.resolve_html(&request.source_url).await?;
        Ok(self.record_from_page(request.source_kind, page).await)
    }

    /// Extracts an already-fetched page. Articles are still summarized.
    pub async fn extract_html(&self, url: &str, html: &str) -> Result<ExtractedRecord> {
        validate_url(url)?;
        let request = ExtractionRequest::new(url);
        let page = RawPage { html: html.to_string(), origin_url: request.source_url };
        Ok(self.record_from_page(request.source_kind, page).await)
    }

    /// Creates a note for `url`.
    ///
    /// Success is reported through [`NoteHost::notify`] and failures through
    /// [`NoteHost::notify_failure`] as well as returned.
    ///
    /// # Errors
    ///
    /// - [`ShelfnoteError::InvalidInput`] for a malformed URL.
    /// - [`ShelfnoteError::TemplateNotFound`] / [`ShelfnoteError::FolderNotFound`]
    ///   when the vault is not set up; no request is made in that case.
    /// - [`ShelfnoteError::FetchFailure`] when every intermediary failed.
    /// - [`ShelfnoteError::FileExists`] when a note with the same name exists.
    /// - [`ShelfnoteError::Cancelled`] when `cancel` fired.
    pub async fn create(&self, url: &str, cancel: &CancellationToken) -> Result<CreatedNote> {
        let outcome = self.run(url, None, cancel).await;
        self.report(&outcome);
        outcome
    }

    /// Creates a note from HTML that was fetched elsewhere.
    pub async fn create_from_html(&self, url: &str, html: &str, cancel: &CancellationToken) -> Result<CreatedNote> {
        let outcome = self.run(url, Some(html), cancel).await;
        self.report(&outcome);
        outcome
    }

    async fn run(&self, url: &str, html: Option<&str>, cancel: &CancellationToken) -> Result<CreatedNote> {
        validate_url(url)?;
        let request = ExtractionRequest::new(url);
        tracing::info!(url = %request.source_url, kind = ?request.source_kind, "pipeline.start");

        let destination = self.check_destination(request.source_kind).await?;
        ensure_active(cancel)?;

        let page = match html {
            Some(html) => RawPage { html: html.to_string(), origin_url: request.source_url.clone() },
            None => until_cancelled(cancel, self.chain.resolve_html(&request.source_url)).await??,
        };
        ensure_active(cancel)?;

        let record = until_cancelled(cancel, self.record_from_page(request.source_kind, page)).await?;
        ensure_active(cancel)?;

        let body = render(&destination.template, &record);
        let note_path = destination.folder.join(sanitize_file_name(record.title()));
        let path = self.host.write_new_file(&note_path, &body).await?;

        tracing::info!(path = %path.display(), kind = ?record.kind(), "pipeline.created");
        Ok(CreatedNote { path, record })
    }

    /// Reads the template and confirms the output folder, mapping failures to
    /// the precondition errors.
    async fn check_destination(&self, kind: SourceKind) -> Result<Destination> {
        let template_path = self.config.template_for(kind);
        let template = self.host.read_file(template_path).await.map_err(|e| {
            tracing::debug!(path = %template_path.display(), error = %e, "pipeline.template_missing");
            ShelfnoteError::TemplateNotFound(template_path.to_path_buf())
        })?;

        let folder = normalize_folder(self.config.folder_for(kind));
        if !folder.as_os_str().is_empty() {
            let folders = self.host.list_folders().await?;
            if !folders.iter().any(|f| f == &folder) {
                return Err(ShelfnoteError::FolderNotFound(folder));
            }
        }

        Ok(Destination { template, folder })
    }

    /// Extracts `page` and, for articles, fills in the summary.
    async fn record_from_page(&self, kind: SourceKind, page: RawPage) -> ExtractedRecord {
        let source_url = page.origin_url.clone();
        match extract_page(kind, page) {
            PageContent::Commerce(book) => ExtractedRecord::Commerce(book),
            PageContent::Article(content) => {
                let summary = self.article_summary(&content).await;
                ExtractedRecord::Article(ArticleRecord { title: content.title, summary, source_url })
            }
        }
    }

    async fn article_summary(&self, content: &ArticleContent) -> String {
        if !self.config.summarize_articles {
            return opening_paragraph(&content.main_text);
        }
        if content.main_text.trim().is_empty() {
            return NO_SUMMARY.to_string();
        }
        self.summarizer.summarize(&content.main_text).await
    }

    fn report(&self, outcome: &Result<CreatedNote>) {
        match outcome {
            Ok(note) => self.host.notify(&format!("Created {}", note.path.display())),
            Err(e) if e.is_precondition() => {
                tracing::info!(error = %e, "pipeline.precondition");
                self.host.notify_failure(&e.to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "pipeline.failed");
                self.host.notify_failure(&e.to_string());
            }
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() { Err(ShelfnoteError::Cancelled) } else { Ok(()) }
}

/// Drives `fut` until it completes or `cancel` fires, dropping it in the
/// latter case.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("pipeline.cancelled");
            Err(ShelfnoteError::Cancelled)
        }
        output = fut => Ok(output),
    }
}

/// Strips `.` components so `"./Books/"` and `"Books"` compare equal.
fn normalize_folder(folder: &Path) -> PathBuf {
    folder.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

fn opening_paragraph(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_SUMMARY.to_string())
}
