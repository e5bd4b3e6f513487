//! CommonMark backend.
//!
//! Markdown has no syntax errors, so this backend never fails. The debug
//! trace is the parser's event stream, one event per line.

use pulldown_cmark::{Options, Parser, html};

use super::{Backend, CompileError, Compiled};

/// Markdown → HTML via pulldown-cmark.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownBackend;

/// Extensions enabled beyond plain CommonMark.
fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

impl Backend for MarkdownBackend {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn compile(&self, source: &str) -> Result<Compiled, CompileError> {
        let events: Vec<_> = Parser::new_ext(source, options()).collect();

        let mut debug = String::new();
        for event in &events {
            debug.push_str(&format!("{event:?}\n"));
        }

        let mut rendered = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut rendered, events.into_iter());

        Ok(Compiled { rendered, debug })
    }
}
