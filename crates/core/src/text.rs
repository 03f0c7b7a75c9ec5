//! Markup-to-text cleaning shared by both extractors.

use regex::Regex;
use std::sync::LazyLock;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static PARAGRAPH_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p\s*>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\f\v\u{a0}]{2,}|[\t\r\f\v\u{a0}]").unwrap());
static SPACE_AROUND_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\n *").unwrap());
static EXTRA_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());

/// Converts an HTML fragment into readable plain text.
///
/// Line breaks become newlines, closed paragraphs become blank lines, every
/// other tag becomes a single space, and whitespace is collapsed without
/// losing the paragraph structure.
///
/// ```rust
/// use shelfnote_core::clean_text;
///
/// let html = "<p>First  <b>bold</b> line<br>second</p><p>Next &amp; last</p>";
/// assert_eq!(clean_text(html), "First bold line\nsecond\n\nNext & last");
/// ```
pub fn clean_text(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = PARAGRAPH_END.replace_all(&text, "\n\n");
    let text = ANY_TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = SPACE_AROUND_NEWLINE.replace_all(&text, "\n");
    let text = EXTRA_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Decodes the handful of named entities that survive serialization, plus
/// numeric character references.
pub fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let raw = &caps[1];
        let code = match raw.strip_prefix('x').or_else(|| raw.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => raw.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32).map(String::from).unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Truncates `text` to at most `max_chars` characters, appending `...` when
/// anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_breaks_and_paragraphs() {
        let html = "<div><p>One</p><p>Two<br/>Three<BR>Four</p></div>";
        assert_eq!(clean_text(html), "One\n\nTwo\nThree\nFour");
    }

    #[test]
    fn test_strips_all_markup() {
        let html = r#"<span class="a-text-bold">Bold</span><i>italic</i><a href="/x">link</a>"#;
        let cleaned = clean_text(html);
        assert_eq!(cleaned, "Bold italic link");
        assert!(!cleaned.contains('<'));
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "  <p>  lots    of\t\tspace  </p>\n\n\n\n<p>next</p>  ";
        assert_eq!(clean_text(html), "lots of space\n\nnext");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("<div>   </div>"), "");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&lt;b&gt;"), "<b>");
        assert_eq!(decode_entities("it&#39;s &#x2014; fine"), "it's \u{2014} fine");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exactly", 7), "exactly");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語...");
    }
}
