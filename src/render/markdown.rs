//! Markdown conversion boundary.

use pulldown_cmark::{Options, Parser, html::push_html};

/// Parser options: GitHub-flavored extensions, no smart punctuation.
fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Convert Markdown text to HTML.
pub fn to_html(text: &str) -> String {
    let parser = Parser::new_ext(text, options());
    let mut html = String::with_capacity(text.len() * 3 / 2);
    push_html(&mut html, parser);
    html
}
