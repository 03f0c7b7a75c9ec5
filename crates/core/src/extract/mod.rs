//! Field extraction from raw pages.
//!
//! Each field is looked up through an ordered list of candidate extractors
//! and the first one that produces a value wins. A field with no match takes
//! its placeholder value, so extraction itself never fails.

pub mod article;
pub mod commerce;

use serde::{Deserialize, Serialize};

use crate::classify::SourceKind;
use crate::parse::Document;
use crate::proxy::RawPage;

pub use article::{ArticleContent, extract_article};
pub use commerce::{CategoryLink, extract_commerce};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const NO_SUMMARY: &str = "No summary available.";
pub const DEFAULT_CATEGORY: &str = "Fiction";

/// A single strategy for locating one field.
pub type FieldExtractor<T> = fn(&Document) -> Option<T>;

/// Runs `candidates` in order and returns the first value produced.
pub fn first_match<T>(doc: &Document, candidates: &[FieldExtractor<T>]) -> Option<T> {
    candidates.iter().find_map(|candidate| candidate(doc))
}

/// Metadata pulled from a storefront listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommerceRecord {
    pub title: String,
    pub author: String,
    pub category: String,
    /// Absolute link to the category page, when the page provided one.
    pub category_url: Option<String>,
    pub description: String,
    pub source_url: String,
}

/// Metadata for an article, with the summary already generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub summary: String,
    pub source_url: String,
}

/// The outcome of extraction, tagged by the kind of page it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExtractedRecord {
    Commerce(CommerceRecord),
    Article(ArticleRecord),
}

impl ExtractedRecord {
    pub fn kind(&self) -> SourceKind {
        match self {
            ExtractedRecord::Commerce(_) => SourceKind::Commerce,
            ExtractedRecord::Article(_) => SourceKind::Article,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ExtractedRecord::Commerce(record) => &record.title,
            ExtractedRecord::Article(record) => &record.title,
        }
    }

    pub fn source_url(&self) -> &str {
        match self {
            ExtractedRecord::Commerce(record) => &record.source_url,
            ExtractedRecord::Article(record) => &record.source_url,
        }
    }
}

/// Page content before any remote summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    Commerce(CommerceRecord),
    Article(ArticleContent),
}

/// Dispatches a fetched page to the extractor for `kind`.
///
/// Consumes the page: the HTML is not needed once fields are pulled out.
pub fn extract_page(kind: SourceKind, page: RawPage) -> PageContent {
    let RawPage { html, origin_url } = page;
    match kind {
        SourceKind::Commerce => PageContent::Commerce(extract_commerce(&html, &origin_url)),
        SourceKind::Article => PageContent::Article(extract_article(&html)),
    }
}

pub(crate) fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| placeholder.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_id(doc: &Document) -> Option<String> {
        doc.first_text("#a")
    }

    fn by_class(doc: &Document) -> Option<String> {
        doc.first_text(".b")
    }

    #[test]
    fn test_first_match_order() {
        let doc = Document::parse(r#"<p id="a">from id</p><p class="b">from class</p>"#);
        assert_eq!(first_match(&doc, &[by_id, by_class]), Some("from id".to_string()));
        assert_eq!(first_match(&doc, &[by_class, by_id]), Some("from class".to_string()));
    }

    #[test]
    fn test_first_match_falls_through() {
        let doc = Document::parse(r#"<p class="b">only class</p>"#);
        assert_eq!(first_match(&doc, &[by_id, by_class]), Some("only class".to_string()));
        assert_eq!(first_match::<String>(&doc, &[by_id]), None);
        assert_eq!(first_match::<String>(&doc, &[]), None);
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder(Some("x".into()), UNKNOWN_TITLE), "x");
        assert_eq!(or_placeholder(Some("  ".into()), UNKNOWN_TITLE), UNKNOWN_TITLE);
        assert_eq!(or_placeholder(None, NO_SUMMARY), NO_SUMMARY);
    }

    #[test]
    fn test_extract_page_dispatch() {
        let page = RawPage {
            html: r#"<span id="productTitle">Dune</span>"#.to_string(),
            origin_url: "https://www.amazon.com/dp/1".to_string(),
        };
        match extract_page(SourceKind::Commerce, page.clone()) {
            PageContent::Commerce(record) => assert_eq!(record.title, "Dune"),
            other => panic!("unexpected: {:?}", other),
        }
        match extract_page(SourceKind::Article, page) {
            PageContent::Article(content) => assert_eq!(content.title, UNKNOWN_TITLE),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_record_serializes_with_kind_tag() {
        let record = ExtractedRecord::Article(ArticleRecord {
            title: "T".into(),
            summary: "S".into(),
            source_url: "https://x.y".into(),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "article");
        assert_eq!(json["title"], "T");
        assert_eq!(record.kind(), SourceKind::Article);
    }
}
