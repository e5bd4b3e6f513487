//! Built-in emblem markup backend.
//!
//! ```text
//! Paragraphs are separated by blank lines.
//! _italic_ *bold* `monospace` !verbatim! - -- --- non~breaking
//! .name[key=value, flag]{argument}{argument}
//! .name: remainder of the line
//! .name:
//!     indented trailer block
//! ::
//!     another trailer block
//! // line comments, /* nested block comments */, \* escapes
//! ```
//!
//! Success renders one `<p>` per paragraph; the debug trace is the parsed
//! document tree. Parse errors carry their span both structurally and in the
//! message text (`... found at L1:C1:L2:C2`).

pub mod ast;
pub mod html;
pub mod parser;

use super::{Backend, CompileError, Compiled};
use crate::preview::DiagnosticRange;
use html::HtmlBuilder;
use parser::ParseError;

/// File name used in error messages.
const SOURCE_NAME: &str = "main.em";

#[derive(Debug, Clone, Copy, Default)]
pub struct EmblemBackend;

impl EmblemBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for EmblemBackend {
    fn name(&self) -> &'static str {
        "emblem"
    }

    fn compile(&self, source: &str) -> Result<Compiled, CompileError> {
        let doc = parser::parse(SOURCE_NAME, source).map_err(CompileError::from)?;

        let mut builder = HtmlBuilder::new();
        builder.build_document(&doc);

        Ok(Compiled {
            rendered: builder.complete(),
            debug: format!("{doc:#?}"),
        })
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        let message = err.to_string();
        let loc = err.loc;
        let range = DiagnosticRange::new(
            (loc.first_line, loc.first_column),
            (loc.last_line, loc.last_column),
            message.clone(),
        );
        CompileError::new(message).with_range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::extract;

    #[test]
    fn test_compile_success() {
        let out = EmblemBackend.compile("hello *world*").unwrap();
        assert_eq!(out.rendered, "<p>hello <b>world</b></p>");
        assert!(out.debug.starts_with("Document {"));
        assert!(out.debug.contains("Bold"));
    }

    #[test]
    fn test_compile_at_depth_limit() {
        let depth = parser::MAX_DEPTH;
        let src = format!("{}x{}", ".b{".repeat(depth), "}".repeat(depth));
        let out = EmblemBackend.compile(&src).unwrap();
        assert!(out.rendered.starts_with("<p><b><b>"));
        assert!(out.debug.contains("\"x\""));
    }

    #[test]
    fn test_structured_range_matches_message() {
        let err = EmblemBackend.compile("one\ntwo }").unwrap_err();
        let structured = err.range.clone().unwrap();

        // textual fallback recovers the same range
        assert_eq!(extract(&err.message), Some(structured.clone()));
        assert_eq!(
            (structured.start_line, structured.start_column),
            (2, 5)
        );
    }
}
