// src/feed/markup.rs

//! Rendering of the markdown stored in content fields.

use pulldown_cmark::{Parser, html};
use scraper::Html;

/// Render markdown to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new(markdown));
    out
}

/// Render a single-line markdown value (titles) to HTML without the
/// enclosing paragraph.
pub fn to_inline_html(markdown: &str) -> String {
    let rendered = to_html(markdown);
    let trimmed = rendered.trim_end();
    match trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
    {
        Some(inner) if !inner.contains("<p>") => inner.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Render markdown to plain text, for consumers that cannot display markup.
pub fn to_plain_text(markdown: &str) -> String {
    let fragment = Html::parse_fragment(&to_html(markdown));
    let text: String = fragment.root_element().text().collect();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html() {
        assert_eq!(to_html("Some **bold** text"), "<p>Some <strong>bold</strong> text</p>\n");
    }

    #[test]
    fn test_to_inline_html() {
        assert_eq!(to_inline_html("A *new* release"), "A <em>new</em> release");
        assert_eq!(to_inline_html("one\n\ntwo"), "<p>one</p>\n<p>two</p>");
    }

    #[test]
    fn test_to_plain_text() {
        assert_eq!(
            to_plain_text("# Title\n\nA [link](http://x.org) and *more*.\n\n- item"),
            "Title\nA link and more.\nitem"
        );
        assert_eq!(to_plain_text("Tom & Jerry"), "Tom & Jerry");
    }
}
