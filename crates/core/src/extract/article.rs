//! Article and blog post extraction.

use super::{FieldExtractor, UNKNOWN_TITLE, first_match, or_placeholder};
use crate::parse::Document;
use crate::preprocess::{PreprocessConfig, preprocess_html};
use crate::text::clean_text;

/// Content containers in priority order. `body` is consulted only after all
/// of these miss.
const MAIN_REGION_SELECTORS: &[&str] =
    &["article", "main", r#"[class*="content"]"#, r#"[class*="entry"]"#, r#"[class*="post"]"#];

const TITLE_CANDIDATES: &[FieldExtractor<String>] = &[page_title, top_heading];

/// Title and readable body of an article, ready for summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    pub title: String,
    pub main_text: String,
}

/// Extracts the title and main text of an article page.
///
/// ```rust
/// use shelfnote_core::extract_article;
///
/// let html = r#"
///     <html><head><title>Async Rust</title></head>
///     <body><nav>Home</nav><article><p>Futures are lazy.</p></article></body></html>
/// "#;
/// let content = extract_article(html);
/// assert_eq!(content.title, "Async Rust");
/// assert_eq!(content.main_text, "Futures are lazy.");
/// ```
pub fn extract_article(html: &str) -> ArticleContent {
    let cleaned = preprocess_html(html, &PreprocessConfig::default());
    let doc = Document::parse(&cleaned);

    let title = or_placeholder(first_match(&doc, TITLE_CANDIDATES), UNKNOWN_TITLE);
    let main_text = main_region(&doc).unwrap_or_else(|| clean_text(&cleaned));

    tracing::debug!(%title, chars = main_text.chars().count(), "extract.article");

    ArticleContent { title, main_text }
}

fn page_title(doc: &Document) -> Option<String> {
    doc.title().map(|t| clean_text(&t)).filter(|t| !t.is_empty())
}

fn top_heading(doc: &Document) -> Option<String> {
    doc.first_inner_html("h1").map(|h| clean_text(&h)).filter(|t| !t.is_empty())
}

fn main_region(doc: &Document) -> Option<String> {
    MAIN_REGION_SELECTORS
        .iter()
        .chain(std::iter::once(&"body"))
        .find_map(|selector| doc.first_inner_html(selector).map(|html| clean_text(&html)).filter(|t| !t.is_empty()))
}
