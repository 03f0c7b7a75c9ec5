use regex::Regex;
use url::Url;

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script tags
    pub remove_scripts: bool,
    /// Whether to remove style tags
    pub remove_styles: bool,
    /// Whether to remove noscript tags
    pub remove_noscript: bool,
    /// Whether to remove svg and iframe tags
    pub remove_embeds: bool,
    /// Whether to remove elements hidden with inline styles
    pub remove_hidden: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_scripts: true,
            remove_styles: true,
            remove_noscript: true,
            remove_embeds: true,
            remove_hidden: true,
        }
    }
}

impl PreprocessConfig {
    /// Settings for storefront pages: the `noscript` description fallback and
    /// collapsed (hidden) description expanders must survive.
    pub fn commerce() -> Self {
        Self { remove_noscript: false, remove_hidden: false, ..Default::default() }
    }
}

/// Remove non-content markup before text is pulled out of a page
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let processed = remove_unwanted_tags(html, config);
    let processed = remove_comments(&processed);

    if config.remove_hidden { remove_hidden_elements(&processed) } else { processed }
}

/// Remove script, style, noscript, svg and iframe tags from HTML
fn remove_unwanted_tags(html: &str, config: &PreprocessConfig) -> String {
    let mut selectors = Vec::new();
    if config.remove_scripts {
        selectors.push("script");
    }
    if config.remove_styles {
        selectors.push("style");
    }
    if config.remove_noscript {
        selectors.push("noscript");
    }
    if config.remove_embeds {
        selectors.push("svg");
        selectors.push("iframe");
    }

    if selectors.is_empty() {
        return html.to_string();
    }

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: selectors
                .into_iter()
                .map(|selector| {
                    lol_html::element!(selector, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Remove HTML comments from the document
fn remove_comments(html: &str) -> String {
    let re = Regex::new(r"(?s)<!--.*?-->").unwrap();
    re.replace_all(html, "").to_string()
}

/// Remove elements with display:none or visibility:hidden styles
fn remove_hidden_elements(html: &str) -> String {
    let hidden_pattern = Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").unwrap();

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![lol_html::element!("*", |el| {
                if let Some(style) = el.get_attribute("style")
                    && hidden_pattern.is_match(&style)
                {
                    el.remove();
                }
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Make a site-relative href (leading `/`) absolute using the scheme and host
/// of `source_url`.
///
/// Absolute and protocol-relative hrefs are returned unchanged, as is anything
/// when `source_url` cannot be parsed.
///
/// ```rust
/// use shelfnote_core::preprocess::absolutize_href;
///
/// assert_eq!(
///     absolutize_href("/b/ref=dp_bc?node=25", "https://www.amazon.com/dp/1"),
///     "https://www.amazon.com/b/ref=dp_bc?node=25"
/// );
/// assert_eq!(absolutize_href("https://x.y/z", "https://www.amazon.com/dp/1"), "https://x.y/z");
/// ```
pub fn absolutize_href(href: &str, source_url: &str) -> String {
    let href = href.trim();
    if !href.starts_with('/') || href.starts_with("//") {
        return href.to_string();
    }

    match Url::parse(source_url) {
        Ok(base) => match base.host_str() {
            Some(host) => {
                let port = base.port().map(|p| format!(":{}", p)).unwrap_or_default();
                format!("{}://{}{}{}", base.scheme(), host, port, href)
            }
            None => href.to_string(),
        },
        Err(_) => href.to_string(),
    }
}
