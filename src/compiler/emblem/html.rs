//! HTML output for a parsed document.

use super::ast::{Content, Document, Par, Sugar};
use crate::utils::html::{escape, escape_attr};

/// Accumulates HTML for a document.
#[derive(Debug, Default)]
pub struct HtmlBuilder {
    content: String,
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `<p>` per paragraph, newline-separated.
    pub fn build_document(&mut self, doc: &Document) {
        self.build_pars(&doc.pars);
    }

    fn build_pars(&mut self, pars: &[Par]) {
        for (i, par) in pars.iter().enumerate() {
            if i > 0 {
                self.content.push('\n');
            }
            self.build_par(par);
        }
    }

    fn build_par(&mut self, par: &Par) {
        // A command carrying its own blocks is not wrapped
        if let [line] = par.lines.as_slice()
            && let [Content::Command { trailers, .. }] = line.as_slice()
            && !trailers.is_empty()
        {
            self.build_all(line);
            return;
        }

        self.content.push_str("<p>");
        for (i, line) in par.lines.iter().enumerate() {
            if i > 0 {
                self.content.push('\n');
            }
            self.build_all(line);
        }
        self.content.push_str("</p>");
    }

    fn build_all(&mut self, contents: &[Content]) {
        for c in contents {
            self.build(c);
        }
    }

    pub fn build(&mut self, content: &Content) {
        match content {
            Content::Command {
                name,
                attrs,
                args,
                remainder,
                trailers,
                ..
            } => {
                self.content.push('<');
                self.content.push_str(name);
                for attr in attrs {
                    self.content.push(' ');
                    self.content.push_str(&escape_attr(&attr.name));
                    if let Some(value) = &attr.value {
                        self.content.push_str("=\"");
                        self.content.push_str(&escape_attr(value));
                        self.content.push('"');
                    }
                }
                self.content.push('>');
                for arg in args {
                    self.build_all(arg);
                }
                if let Some(arg) = remainder {
                    self.build_all(arg);
                }
                for block in trailers {
                    self.build_pars(block);
                }
                self.content.push_str("</");
                self.content.push_str(name);
                self.content.push('>');
            }
            Content::Word { word, .. } => self.content.push_str(&escape(word)),
            Content::Whitespace { whitespace, .. } => self.content.push_str(whitespace),
            Content::Dash { dash, .. } => self.content.push_str(dash.as_str()),
            Content::Glue { glue, .. } => {
                for _ in glue.chars() {
                    self.content.push_str("&nbsp;");
                }
            }
            Content::Verbatim { verbatim, .. } => self.content.push_str(&escape(verbatim)),
            Content::Sugar(sugar) => match sugar {
                Sugar::Italic { arg, .. } => self.wrap("i", arg),
                Sugar::Bold { arg, .. } => self.wrap("b", arg),
                Sugar::Monospace { text, .. } => {
                    self.content.push_str("<code>");
                    self.content.push_str(&escape(text));
                    self.content.push_str("</code>");
                }
            },
        }
    }

    fn wrap(&mut self, tag: &str, arg: &[Content]) {
        self.content.push('<');
        self.content.push_str(tag);
        self.content.push('>');
        self.build_all(arg);
        self.content.push_str("</");
        self.content.push_str(tag);
        self.content.push('>');
    }

    pub fn complete(self) -> String {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::emblem::parser::parse;

    fn render(src: &str) -> String {
        let mut builder = HtmlBuilder::new();
        builder.build_document(&parse("main.em", src).unwrap());
        builder.complete()
    }

    #[test]
    fn test_plain_paragraph() {
        assert_eq!(render("ok"), "<p>ok</p>");
        assert_eq!(render("a\nb\n\nc"), "<p>a\nb</p>\n<p>c</p>");
    }

    #[test]
    fn test_sugar() {
        assert_eq!(
            render("_it_ *bold* `x<y`"),
            "<p><i>it</i> <b>bold</b> <code>x&lt;y</code></p>"
        );
    }

    #[test]
    fn test_nested_sugar() {
        assert_eq!(render("*a _b_ c*"), "<p><b>a <i>b</i> c</b></p>");
    }

    #[test]
    fn test_command() {
        assert_eq!(
            render(".a[href=https://x.y/?a&b]{see .em{here}}"),
            "<p><a href=\"https://x.y/?a&amp;b\">see <em>here</em></a></p>"
        );
        assert_eq!(render(".hr"), "<p><hr></hr></p>");
    }

    #[test]
    fn test_dashes_and_escaping() {
        assert_eq!(render("a--b <tag>"), "<p>a\u{2013}b &lt;tag&gt;</p>");
    }

    #[test]
    fn test_remainder_and_trailers() {
        assert_eq!(render(".h1: Title *here*"), "<p><h1>Title <b>here</b></h1></p>");
        assert_eq!(
            render("intro\n.div:\n  one\n\n  two\n::\n  three\nend"),
            "<p>intro</p>\n<div><p>one</p>\n<p>two</p><p>three</p></div>\n<p>end</p>"
        );
    }

    #[test]
    fn test_trailer_after_text_stays_in_paragraph() {
        assert_eq!(
            render("see .aside:\n  note"),
            "<p>see <aside><p>note</p></aside></p>"
        );
    }

    #[test]
    fn test_glue_verbatim_and_comments() {
        assert_eq!(
            render("a~~b !<raw>! /* gone\n */c"),
            "<p>a&nbsp;&nbsp;b &lt;raw&gt; c</p>"
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(""), "");
        assert_eq!(render("\n\n  \n"), "");
    }
}
