pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod host;
pub mod parse;
pub mod pipeline;
pub mod preprocess;
pub mod proxy;
pub mod render;
pub mod summarize;
pub mod text;

pub use classify::{ExtractionRequest, SourceKind, classify, find_url_near, validate_url};
pub use config::{Config, ConfigBuilder};
pub use error::{Result, ShelfnoteError};
pub use extract::{
    ArticleContent, ArticleRecord, CategoryLink, CommerceRecord, ExtractedRecord, PageContent, extract_article,
    extract_commerce, extract_page,
};
pub use fetch::{FetchConfig, FetchedPage, RetryPolicy, fetch_with_retry, retry_with_backoff};
pub use host::{FsHost, NoteHost};
pub use parse::Document;
pub use pipeline::{CreatedNote, NoteCreator};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
pub use proxy::{Intermediary, ProxyChain, RawPage, default_intermediaries, first_success};
pub use render::{RenderContext, link_display, markdown_link, render, sanitize_file_name};
pub use summarize::Summarizer;
pub use text::clean_text;
