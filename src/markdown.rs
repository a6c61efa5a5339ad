//! Markdown to HTML conversion.

use pulldown_cmark::{Options, Parser, html};

/// Convert a Markdown body to HTML.
///
/// The extension set matches what post bodies actually use: footnotes,
/// tables, task lists, strikethrough, and smart punctuation.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_and_emphasis() {
        let html = to_html("Hello *world*.");
        assert!(html.contains("<p>"));
        assert!(html.contains("<em>world</em>"));
    }

    #[test]
    fn test_tables_enabled() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_strikethrough_enabled() {
        let html = to_html("~~gone~~");
        assert!(html.contains("<del>"));
    }

    #[test]
    fn test_footnotes_enabled() {
        let html = to_html("text[^1]\n\n[^1]: note");
        assert!(html.contains("footnote"));
    }

    #[test]
    fn test_smart_punctuation() {
        let html = to_html("\"quoted\"");
        assert!(html.contains("\u{201c}quoted\u{201d}"));
    }
}
