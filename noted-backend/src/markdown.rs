//! Markdown -> HTML rendering for note display.
//!
//! Output is a pure function of the input text, so rendering the same
//! stored content always produces identical HTML.

use pulldown_cmark::{html, Options, Parser};

/// Render Markdown content to an HTML fragment
pub fn render(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(content, options);

    let mut output = String::with_capacity(content.len() * 2);
    html::push_html(&mut output, parser);
    output
}
