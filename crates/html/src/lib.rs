//! # HTML Text Extraction
//!
//! Reduces an HTML document to the text a reader would see, for handing to
//! the Extraction Service.

use scraper::{Html, Node};
use vizon::ingest::truncate_chars;

/// Elements whose text content is never visible.
pub const DEFAULT_SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "iframe", "svg"];

/// Extracts the text nodes of `html` that are not inside a skipped element.
///
/// Text nodes are joined with single spaces and runs of whitespace are collapsed.
/// `skip` defaults to [`DEFAULT_SKIPPED_TAGS`].
pub fn html_to_text(html: &str, skip: Option<&[&str]>) -> String {
    let skip = skip.unwrap_or(DEFAULT_SKIPPED_TAGS);
    let document = Html::parse_document(html);

    let mut pieces: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => skip.contains(&element.name()),
            _ => false,
        });
        if !hidden {
            pieces.push(text);
        }
    }

    collapse_whitespace(&pieces.join(" "))
}

/// Replaces every run of whitespace with a single space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of `html`, capped at `max_chars` characters.
pub fn visible_text(html: &str, max_chars: usize) -> String {
    let text = html_to_text(html, None);
    truncate_chars(&text, max_chars).trim_end().to_string()
}
