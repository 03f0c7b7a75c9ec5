//! HTML parsing and element lookup.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! extractors. Lookups come in two flavors: [`Document::select`] reports an
//! invalid selector as an error, while the `first_*` helpers treat every
//! failure as "no match" so extraction can fall through to the next
//! candidate.
//!
//! # Example
//!
//! ```rust
//! use shelfnote_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <span id="productTitle"> Dune </span>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! assert_eq!(doc.first_text("#productTitle"), Some("Dune".to_string()));
//! assert_eq!(doc.first_text("#missing"), None);
//! ```

use scraper::{Html, Selector};

use crate::{Result, ShelfnoteError};

/// A parsed HTML document.
///
/// Parsing never fails: html5ever recovers from any malformed input.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfnoteError::HtmlParse`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shelfnote_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// First element matching `selector`, or `None` on no match or a bad selector.
    pub fn select_first(&'_ self, selector: &str) -> Option<Element<'_>> {
        let sel = parse_selector(selector).ok()?;
        self.html.select(&sel).next().map(|el| Element { element: el })
    }

    /// Trimmed text of the first match, if non-empty.
    pub fn first_text(&self, selector: &str) -> Option<String> {
        self.select_first(selector).and_then(|el| non_empty(el.text()))
    }

    /// Inner HTML of the first match whose text content is non-empty.
    pub fn first_inner_html(&self, selector: &str) -> Option<String> {
        let sel = parse_selector(selector).ok()?;
        self.html
            .select(&sel)
            .map(|el| Element { element: el })
            .find(|el| !el.text().trim().is_empty())
            .map(|el| el.inner_html())
    }

    /// Gets the title of the document.
    ///
    /// Returns the trimmed content of the `<title>` element if present and non-empty.
    pub fn title(&self) -> Option<String> {
        self.first_text("title")
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use shelfnote_core::parse::Document;
///
/// let html = r#"<a href="/gp/browse">Science Fiction</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Science Fiction");
/// assert_eq!(link.attr("href"), Some("/gp/browse"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the inner HTML of this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ShelfnoteError::HtmlParse`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ShelfnoteError::HtmlParse(format!("Invalid selector: {}", e)))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
