//! Template rendering for extracted records.
//!
//! Templates are plain Markdown containing `{{namespace:field}}` tokens.
//! Storefront records fill the `book-creator` namespace and articles fill
//! `blog-creator`. Tokens belonging to the other namespace, or naming a field
//! that does not exist, are left in the output untouched.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::extract::{ArticleRecord, CommerceRecord, ExtractedRecord};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{[a-z-]+:[a-z-]+\}\}").unwrap());

pub const BOOK_NAMESPACE: &str = "book-creator";
pub const BLOG_NAMESPACE: &str = "blog-creator";

/// Characters that would break a Markdown link label or a wiki-style link.
const LINK_STRUCTURAL_CHARS: &[char] = &['#', '[', ']', '|'];

/// Characters that are not allowed in note file names.
const ILLEGAL_FILE_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

const UNTITLED: &str = "Untitled";

/// Substitutions for a single record, in token order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    substitutions: Vec<(String, String)>,
}

impl RenderContext {
    pub fn for_record(record: &ExtractedRecord) -> Self {
        match record {
            ExtractedRecord::Commerce(book) => Self::for_book(book),
            ExtractedRecord::Article(article) => Self::for_article(article),
        }
    }

    fn for_book(book: &CommerceRecord) -> Self {
        let genre_link = match &book.category_url {
            Some(url) => markdown_link(&book.category, url),
            None => link_display(&book.category),
        };

        Self::namespaced(
            BOOK_NAMESPACE,
            [
                ("title", book.title.clone()),
                ("author", book.author.clone()),
                ("genre", book.category.clone()),
                ("genre-link", genre_link),
                ("summary", book.description.clone()),
                ("amazon-link", markdown_link(&book.title, &book.source_url)),
            ],
        )
    }

    fn for_article(article: &ArticleRecord) -> Self {
        Self::namespaced(
            BLOG_NAMESPACE,
            [
                ("title", article.title.clone()),
                ("summary", article.summary.clone()),
                ("blog-link", markdown_link(&article.title, &article.source_url)),
            ],
        )
    }

    fn namespaced<const N: usize>(namespace: &str, fields: [(&str, String); N]) -> Self {
        let substitutions =
            fields.into_iter().map(|(field, value)| (format!("{{{{{}:{}}}}}", namespace, field), value)).collect();
        Self { substitutions }
    }

    /// Every token this context knows how to replace.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.substitutions.iter().map(|(token, _)| token.as_str())
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.substitutions.iter().find(|(t, _)| t == token).map(|(_, value)| value.as_str())
    }

    /// Replaces every known token in `template` in a single pass.
    ///
    /// Substituted values are never rescanned, so a value that itself contains
    /// a token is written out verbatim.
    pub fn apply(&self, template: &str) -> String {
        TOKEN
            .replace_all(template, |caps: &Captures| {
                let token = &caps[0];
                self.get(token).unwrap_or(token).to_string()
            })
            .into_owned()
    }
}

/// Renders `template` with the values of `record`.
///
/// ```rust
/// use shelfnote_core::{CommerceRecord, ExtractedRecord, render};
///
/// let record = ExtractedRecord::Commerce(CommerceRecord {
///     title: "Dune".into(),
///     author: "Herbert".into(),
///     category: "Science Fiction".into(),
///     category_url: None,
///     description: "Spice.".into(),
///     source_url: "https://www.amazon.com/dp/0441013597".into(),
/// });
///
/// assert_eq!(render("{{book-creator:title}} by {{book-creator:author}}", &record), "Dune by Herbert");
/// ```
pub fn render(template: &str, record: &ExtractedRecord) -> String {
    RenderContext::for_record(record).apply(template)
}

/// Strips link-structural characters from link display text.
pub fn link_display(text: &str) -> String {
    text.chars().filter(|c| !LINK_STRUCTURAL_CHARS.contains(c)).collect::<String>().trim().to_string()
}

/// Formats a Markdown link with a sanitized label.
pub fn markdown_link(display: &str, url: &str) -> String {
    format!("[{}]({})", link_display(display), url)
}

/// Builds the note file name for `title`: illegal characters removed and a
/// `.md` extension added.
///
/// ```rust
/// use shelfnote_core::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("Foo: Bar/Baz?"), "Foo BarBaz.md");
/// ```
pub fn sanitize_file_name(title: &str) -> String {
    let stem: String = title.chars().filter(|c| !ILLEGAL_FILE_NAME_CHARS.contains(c)).collect();
    let stem = stem.trim();
    let stem = if stem.is_empty() { UNTITLED } else { stem };
    format!("{}.md", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn book() -> ExtractedRecord {
        ExtractedRecord::Commerce(CommerceRecord {
            title: "Dune".into(),
            author: "Herbert".into(),
            category: "Science Fiction".into(),
            category_url: Some("https://www.amazon.com/b?node=16272".into()),
            description: "Desert planet.".into(),
            source_url: "https://www.amazon.com/dp/0441013597".into(),
        })
    }

    fn article() -> ExtractedRecord {
        ExtractedRecord::Article(ArticleRecord {
            title: "Pinning [explained]".into(),
            summary: "Pin keeps futures in place.".into(),
            source_url: "https://blog.example.com/pin".into(),
        })
    }

    #[test]
    fn test_render_book() {
        let out = render("{{book-creator:title}} by {{book-creator:author}}", &book());
        assert_eq!(out, "Dune by Herbert");
    }

    #[test]
    fn test_render_every_book_field() {
        let template = "# {{book-creator:title}}\n\
            genre: {{book-creator:genre}}\n\
            {{book-creator:genre-link}}\n\
            {{book-creator:summary}}\n\
            {{book-creator:amazon-link}}";
        let out = render(template, &book());
        assert_eq!(
            out,
            "# Dune\ngenre: Science Fiction\n[Science Fiction](https://www.amazon.com/b?node=16272)\n\
             Desert planet.\n[Dune](https://www.amazon.com/dp/0441013597)"
        );
    }

    #[test]
    fn test_repeated_tokens_all_replaced() {
        let out = render("{{book-creator:title}}/{{book-creator:title}}", &book());
        assert_eq!(out, "Dune/Dune");
    }

    #[test]
    fn test_genre_link_without_url_is_plain() {
        let record = ExtractedRecord::Commerce(CommerceRecord {
            title: "T".into(),
            author: "A".into(),
            category: "Fiction".into(),
            category_url: None,
            description: "D".into(),
            source_url: "https://a.co/x".into(),
        });
        assert_eq!(render("{{book-creator:genre-link}}", &record), "Fiction");
    }

    #[test]
    fn test_render_article() {
        let out = render("{{blog-creator:title}}\n{{blog-creator:summary}}\n{{blog-creator:blog-link}}", &article());
        assert_eq!(
            out,
            "Pinning [explained]\nPin keeps futures in place.\n[Pinning explained](https://blog.example.com/pin)"
        );
    }

    #[test]
    fn test_foreign_and_unknown_tokens_untouched() {
        let template = "{{book-creator:title}} {{blog-creator:title}} {{book-creator:isbn}} {{other}}";
        assert_eq!(render(template, &book()), "Dune {{blog-creator:title}} {{book-creator:isbn}} {{other}}");
        assert_eq!(
            render(template, &article()),
            "{{book-creator:title}} Pinning [explained] {{book-creator:isbn}} {{other}}"
        );
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let record = ExtractedRecord::Commerce(CommerceRecord {
            title: "Dune".into(),
            author: "{{book-creator:title}}".into(),
            category: "Fiction".into(),
            category_url: None,
            description: "Use {{book-creator:amazon-link}} in templates".into(),
            source_url: "https://www.amazon.com/dp/1".into(),
        });

        assert_eq!(render("{{book-creator:summary}}", &record), "Use {{book-creator:amazon-link}} in templates");
        assert_eq!(render("{{book-creator:author}}|{{book-creator:title}}", &record), "{{book-creator:title}}|Dune");
    }

    #[test]
    fn test_context_tokens() {
        let context = RenderContext::for_record(&article());
        let tokens: Vec<&str> = context.tokens().collect();
        assert_eq!(tokens, vec!["{{blog-creator:title}}", "{{blog-creator:summary}}", "{{blog-creator:blog-link}}"]);
        assert_eq!(context.get("{{blog-creator:summary}}"), Some("Pin keeps futures in place."));
        assert_eq!(context.get("{{book-creator:title}}"), None);
    }

    #[rstest]
    #[case("A#B[C]D|E", "ABCDE")]
    #[case("  [Dune]  ", "Dune")]
    #[case("Plain", "Plain")]
    #[case("#|[]", "")]
    fn test_link_display(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(link_display(input), expected);
    }

    #[rstest]
    #[case("Foo: Bar/Baz?", "Foo BarBaz.md")]
    #[case(r#"a\b*c"d<e>f|g"#, "abcdefg.md")]
    #[case("Dune", "Dune.md")]
    #[case("Children of Dune (Book 3)", "Children of Dune (Book 3).md")]
    #[case("???", "Untitled.md")]
    fn test_sanitize_file_name(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_name(title), expected);
    }
}
