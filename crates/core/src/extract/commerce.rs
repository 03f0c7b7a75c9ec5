//! Storefront listing extraction.
//!
//! Marker ids and classes follow the layout of Amazon product pages. Every
//! lookup is a heuristic; the category heuristic in particular depends on
//! breadcrumb ordering and should be read as best-effort.

use super::{
    CommerceRecord, DEFAULT_CATEGORY, FieldExtractor, NO_SUMMARY, UNKNOWN_AUTHOR, UNKNOWN_TITLE, first_match,
    or_placeholder,
};
use crate::parse::Document;
use crate::preprocess::{PreprocessConfig, absolutize_href, preprocess_html};
use crate::text::clean_text;

/// Breadcrumb labels too broad to describe a book's genre.
pub const GENERIC_CATEGORIES: &[&str] = &["Books", "Kindle Store", "Kindle eBooks"];

const BREADCRUMBS: &str = "#wayfinding-breadcrumbs_feature_div";

/// Best-sellers-rank category links, most specific lists first.
const RANKED_CATEGORY_SELECTORS: &[&str] = &[
    "#detailBulletsWrapper_feature_div ul.zg_hrsr a",
    "#SalesRank ul.zg_hrsr a",
    ".zg_hrsr_ladder a",
    "#SalesRank a",
];

const TITLE_CANDIDATES: &[FieldExtractor<String>] = &[product_title, ebook_title];
const AUTHOR_CANDIDATES: &[FieldExtractor<String>] = &[byline_author, contributor_author];
const DESCRIPTION_CANDIDATES: &[FieldExtractor<String>] =
    &[book_description, product_description, expander_description, noscript_description];

/// A category label and its link, when the page provided one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLink {
    pub name: String,
    pub href: Option<String>,
}

/// Extracts listing metadata from a storefront page.
///
/// Never fails: missing fields take their placeholder values.
///
/// # Example
///
/// ```rust
/// use shelfnote_core::extract_commerce;
///
/// let html = r#"
///     <span id="productTitle">Dune</span>
///     <span class="author"><a class="contributorNameID">Frank Herbert</a></span>
/// "#;
/// let record = extract_commerce(html, "https://www.amazon.com/dp/0441013597");
/// assert_eq!(record.title, "Dune");
/// assert_eq!(record.author, "Frank Herbert");
/// assert_eq!(record.description, "No summary available.");
/// assert_eq!(record.category, "Fiction");
/// ```
pub fn extract_commerce(html: &str, source_url: &str) -> CommerceRecord {
    let cleaned = preprocess_html(html, &PreprocessConfig::commerce());
    let doc = Document::parse(&cleaned);

    let title = or_placeholder(first_match(&doc, TITLE_CANDIDATES), UNKNOWN_TITLE);
    let author = or_placeholder(first_match(&doc, AUTHOR_CANDIDATES), UNKNOWN_AUTHOR);
    let description = or_placeholder(first_match(&doc, DESCRIPTION_CANDIDATES), NO_SUMMARY);

    let (category, category_url) = match find_category(&doc) {
        Some(link) => (link.name, link.href.map(|href| absolutize_href(&href, source_url))),
        None => (DEFAULT_CATEGORY.to_string(), None),
    };

    tracing::debug!(%title, %author, %category, has_category_url = category_url.is_some(), "extract.commerce");

    CommerceRecord { title, author, category, category_url, description, source_url: source_url.to_string() }
}

/// Picks the most specific category.
///
/// The last breadcrumb wins unless it is one of [`GENERIC_CATEGORIES`], in
/// which case the best-sellers-rank links are consulted. A generic breadcrumb
/// is still preferred over nothing.
pub fn find_category(doc: &Document) -> Option<CategoryLink> {
    match breadcrumb_category(doc) {
        Some(link) if !is_generic(&link.name) => Some(link),
        breadcrumb => ranked_category(doc).or(breadcrumb),
    }
}

fn breadcrumb_category(doc: &Document) -> Option<CategoryLink> {
    let block = doc.select_first(BREADCRUMBS)?;
    let anchors = block.select("a").ok()?;

    anchors
        .iter()
        .filter_map(|anchor| {
            let name = clean_text(&anchor.inner_html());
            if name.is_empty() {
                return None;
            }
            let href = anchor.attr("href").map(str::trim).filter(|h| !h.is_empty()).map(str::to_string);
            Some(CategoryLink { name, href })
        })
        .last()
}

fn ranked_category(doc: &Document) -> Option<CategoryLink> {
    RANKED_CATEGORY_SELECTORS.iter().find_map(|selector| {
        let anchor = doc.select_first(selector)?;
        let name = clean_text(&anchor.inner_html());
        if name.is_empty() || is_generic(&name) {
            return None;
        }
        let href = anchor.attr("href").map(str::trim).filter(|h| !h.is_empty()).map(str::to_string);
        Some(CategoryLink { name, href })
    })
}

fn is_generic(name: &str) -> bool {
    GENERIC_CATEGORIES.iter().any(|generic| generic.eq_ignore_ascii_case(name.trim()))
}

fn product_title(doc: &Document) -> Option<String> {
    doc.first_text("#productTitle")
}

fn ebook_title(doc: &Document) -> Option<String> {
    doc.first_text("#ebooksProductTitle")
}

fn byline_author(doc: &Document) -> Option<String> {
    doc.first_text("#bylineInfo .author a")
}

fn contributor_author(doc: &Document) -> Option<String> {
    doc.first_text(".contributorNameID")
}

fn book_description(doc: &Document) -> Option<String> {
    block_text(doc, "#bookDescription_feature_div")
}

fn product_description(doc: &Document) -> Option<String> {
    block_text(doc, "#productDescription")
}

fn expander_description(doc: &Document) -> Option<String> {
    block_text(doc, r#"[data-a-expander-name="book_description_expander"]"#)
}

/// The description some listings only ship inside a `noscript` block. Its
/// content is raw text to the parser, so markup is stripped from the text.
fn noscript_description(doc: &Document) -> Option<String> {
    let elements = doc.select("noscript").ok()?;
    elements.iter().find_map(|el| {
        let text = clean_text(&el.text());
        if text.is_empty() { None } else { Some(text) }
    })
}

fn block_text(doc: &Document, selector: &str) -> Option<String> {
    let html = doc.first_inner_html(selector)?;
    let text = clean_text(&html);
    if text.is_empty() { None } else { Some(text) }
}
