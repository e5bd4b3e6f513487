//! Recursive descent parser.
//!
//! Works directly on the source characters, tracking 1-based line/column as
//! it goes. Columns count UTF-16 code units, the unit editors use. Nested
//! constructs (braced arguments, sugar) push their closing character onto
//! `closers`; words stop at any active closer so the innermost construct can
//! claim it.
//!
//! Lines are grouped into blocks by indentation. A command ending its line
//! with `:` takes the following, deeper indented lines as a trailer block.

use std::mem::take;

use thiserror::Error;

use super::ast::{Attr, Content, Dash, Document, Location, Par, Sugar};

/// Deepest allowed nesting of arguments, sugar and trailer blocks.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("unexpected '}}'")]
    UnexpectedBrace,

    #[error("unclosed '{{'")]
    UnclosedBrace,

    #[error("unclosed {0} delimiter '{1}'")]
    UnclosedSugar(&'static str, char),

    #[error("missing command name after '.'")]
    MissingCommandName,

    #[error("unclosed attribute list")]
    UnclosedAttrs,

    #[error("unclosed '/*' comment")]
    UnclosedComment,

    #[error("missing indented block after ':'")]
    EmptyTrailer,

    #[error("nesting deeper than {max} levels", max = MAX_DEPTH)]
    TooDeep,
}

/// Parse failure with the span it covers.
///
/// The display form ends in `found at L1:C1:L2:C2`, which editors use to
/// place the marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}: {kind} found at {loc}")]
pub struct ParseError {
    pub file: String,
    pub kind: ErrorKind,
    pub loc: Location,
}

/// Parse a whole document.
pub fn parse(file: &str, src: &str) -> Result<Document, ParseError> {
    Parser::new(file, src).document()
}

/// How a line ended.
struct Line {
    items: Vec<Content>,
    /// Held a comment, so an otherwise empty line keeps the paragraph open.
    commented: bool,
    /// A trailer block consumed the following lines.
    trailer: bool,
}

struct Parser<'s> {
    file: &'s str,
    src: &'s str,
    pos: usize,
    line: u32,
    col: u32,
    closers: Vec<char>,
    depth: usize,
    /// Indentation of the line being parsed.
    line_indent: usize,
}

impl<'s> Parser<'s> {
    fn new(file: &'s str, src: &'s str) -> Self {
        Self {
            file,
            src,
            pos: 0,
            line: 1,
            col: 1,
            closers: Vec::new(),
            depth: 0,
            line_indent: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn here(&self) -> (u32, u32) {
        (self.line, self.col)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += c.len_utf16() as u32;
        }
        Some(c)
    }

    fn loc_from(&self, start: (u32, u32)) -> Location {
        Location::new(start, self.here())
    }

    fn error(&self, kind: ErrorKind, start: (u32, u32)) -> ParseError {
        self.error_span(kind, start, self.here())
    }

    fn error_span(&self, kind: ErrorKind, start: (u32, u32), end: (u32, u32)) -> ParseError {
        ParseError {
            file: self.file.to_string(),
            kind,
            loc: Location::new(start, end),
        }
    }

    /// Rest of the current line is empty or whitespace.
    fn at_blank_line(&self) -> bool {
        self.src[self.pos..]
            .split('\n')
            .next()
            .is_none_or(|rest| rest.chars().all(is_inline_space))
    }

    /// Leading spaces and tabs from the cursor.
    fn indent_width(&self) -> usize {
        self.src[self.pos..]
            .chars()
            .take_while(|&c| c == ' ' || c == '\t')
            .count()
    }

    /// Indentation of the next non-blank line, starting at the cursor.
    fn next_indent(&self) -> Option<usize> {
        self.src[self.pos..]
            .split('\n')
            .find(|line| !line.chars().all(is_inline_space))
            .map(|line| line.chars().take_while(|&c| c == ' ' || c == '\t').count())
    }

    fn skip_indent(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
    }

    /// Up to and including the next newline.
    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Closer of an enclosing construct (not the innermost one).
    fn is_outer_closer(&self, c: char) -> bool {
        let inner = self.closers.len().saturating_sub(1);
        self.closers[..inner].contains(&c)
    }

    fn is_word_stop(&self, c: char) -> bool {
        c.is_whitespace()
            || matches!(c, '\\' | '{' | '}' | '`' | '-' | '~')
            || (c == '/' && matches!(self.peek_at(1), Some('/' | '*')))
            || self.closers.contains(&c)
    }

    fn enter(&mut self, open: (u32, u32)) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(ErrorKind::TooDeep, open));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    fn document(mut self) -> Result<Document, ParseError> {
        let pars = self.block(0)?;
        Ok(Document { pars })
    }

    /// Paragraphs of lines indented at least `indent`.
    fn block(&mut self, indent: usize) -> Result<Vec<Par>, ParseError> {
        let mut pars = Vec::new();
        let mut par = Par::default();

        while self.peek().is_some() {
            if self.at_blank_line() {
                self.skip_line();
                if !par.lines.is_empty() {
                    pars.push(take(&mut par));
                }
                continue;
            }

            let width = self.indent_width();
            if width < indent {
                break;
            }
            self.line_indent = width;
            self.skip_indent();

            let Line {
                mut items,
                commented,
                trailer,
            } = self.line()?;
            trim_trailing_space(&mut items);

            if trailer {
                // A command standing alone gets its own paragraph
                if items.len() == 1 && !par.lines.is_empty() {
                    pars.push(take(&mut par));
                }
                par.lines.push(items);
                pars.push(take(&mut par));
            } else if !is_blank(&items) {
                par.lines.push(items);
            } else if !commented && !par.lines.is_empty() {
                pars.push(take(&mut par));
            }
        }

        if !par.lines.is_empty() {
            pars.push(par);
        }
        Ok(pars)
    }

    /// One source line, consuming its newline.
    fn line(&mut self) -> Result<Line, ParseError> {
        let mut line = Line {
            items: Vec::new(),
            commented: false,
            trailer: false,
        };

        loop {
            match self.peek() {
                None => break,
                Some('\n') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    match self.content()? {
                        Some(c) => line.items.push(c),
                        None => line.commented = true,
                    }
                    // Trailer blocks leave the cursor at a line start
                    if self.col == 1 {
                        line.trailer = true;
                        break;
                    }
                }
            }
        }
        Ok(line)
    }

    /// Content up to (and consuming) `closer`.
    fn sequence(
        &mut self,
        closer: char,
        open: (u32, u32),
        unclosed: ErrorKind,
    ) -> Result<Vec<Content>, ParseError> {
        self.enter(open)?;
        self.closers.push(closer);
        let result = self.sequence_inner(closer, open, unclosed);
        self.closers.pop();
        self.leave();
        result
    }

    fn sequence_inner(
        &mut self,
        closer: char,
        open: (u32, u32),
        unclosed: ErrorKind,
    ) -> Result<Vec<Content>, ParseError> {
        let mut items = Vec::new();

        loop {
            match self.peek() {
                None => return Err(self.error(unclosed, open)),
                Some(c) if c == closer => {
                    self.bump();
                    return Ok(items);
                }
                Some(c) if self.is_outer_closer(c) => return Err(self.error(unclosed, open)),
                Some('\n') => {
                    let start = self.here();
                    self.bump();
                    if self.at_blank_line() {
                        return Err(self.error(unclosed, open));
                    }
                    items.push(Content::Whitespace {
                        whitespace: "\n".to_string(),
                        loc: self.loc_from(start),
                    });
                }
                Some(_) => {
                    if let Some(c) = self.content()? {
                        items.push(c);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------------

    /// One content item; `None` for a comment.
    fn content(&mut self) -> Result<Option<Content>, ParseError> {
        let start = self.here();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let content = match c {
            '/' if self.peek_at(1) == Some('/') => {
                self.skip_comment();
                return Ok(None);
            }
            '/' if self.peek_at(1) == Some('*') => {
                self.block_comment()?;
                return Ok(None);
            }
            '}' => {
                self.bump();
                return Err(self.error(ErrorKind::UnexpectedBrace, start));
            }
            '.' => match self.peek_at(1) {
                Some(n) if n.is_ascii_alphabetic() => self.command()?,
                Some('{' | '[') => {
                    self.bump();
                    return Err(self.error(ErrorKind::MissingCommandName, start));
                }
                _ => self.word(),
            },
            '!' if self
                .peek_at(1)
                .is_some_and(|n| !n.is_whitespace() && n != '!') =>
            {
                self.verbatim()?
            }
            '\\' => self.escaped(),
            '_' => self.sugar('_', "italic")?,
            '*' => self.sugar('*', "bold")?,
            '`' => self.monospace()?,
            '-' => self.dash(),
            '~' => self.glue(),
            c if is_inline_space(c) => self.whitespace(),
            _ => self.word(),
        };
        Ok(Some(content))
    }

    fn skip_comment(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
    }

    /// `/* ... */`, nesting, may span lines.
    fn block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.here();
        let mut open = 0usize;

        loop {
            match (self.peek(), self.peek_at(1)) {
                (None, _) => return Err(self.error(ErrorKind::UnclosedComment, start)),
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    open += 1;
                }
                (Some('*'), Some('/')) => {
                    self.bump();
                    self.bump();
                    open -= 1;
                    if open == 0 {
                        return Ok(());
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn word(&mut self) -> Content {
        let start = self.here();
        let mut word = String::new();
        // First character is always taken (e.g. a lone '.' or '{')
        if let Some(c) = self.bump() {
            word.push(c);
        }
        while let Some(c) = self.peek() {
            if self.is_word_stop(c) {
                break;
            }
            word.push(c);
            self.bump();
        }
        Content::Word {
            word,
            loc: self.loc_from(start),
        }
    }

    fn escaped(&mut self) -> Content {
        let start = self.here();
        self.bump();
        let word = match self.peek() {
            Some(c) if c != '\n' => {
                self.bump();
                c.to_string()
            }
            _ => "\\".to_string(),
        };
        Content::Word {
            word,
            loc: self.loc_from(start),
        }
    }

    fn whitespace(&mut self) -> Content {
        let start = self.here();
        let mut whitespace = String::new();
        while let Some(c) = self.peek().filter(|&c| is_inline_space(c)) {
            whitespace.push(c);
            self.bump();
        }
        Content::Whitespace {
            whitespace,
            loc: self.loc_from(start),
        }
    }

    fn glue(&mut self) -> Content {
        let start = self.here();
        let mut glue = String::new();
        while self.peek() == Some('~') {
            glue.push('~');
            self.bump();
        }
        Content::Glue {
            glue,
            loc: self.loc_from(start),
        }
    }

    fn dash(&mut self) -> Content {
        let start = self.here();
        let mut count = 0;
        while count < 3 && self.peek() == Some('-') {
            self.bump();
            count += 1;
        }
        let dash = match count {
            1 => Dash::Hyphen,
            2 => Dash::En,
            _ => Dash::Em,
        };
        Content::Dash {
            dash,
            loc: self.loc_from(start),
        }
    }

    fn sugar(&mut self, delim: char, kind: &'static str) -> Result<Content, ParseError> {
        let start = self.here();
        self.bump();
        let arg = self.sequence(delim, start, ErrorKind::UnclosedSugar(kind, delim))?;
        let loc = self.loc_from(start);
        Ok(Content::Sugar(if delim == '_' {
            Sugar::Italic { arg, loc }
        } else {
            Sugar::Bold { arg, loc }
        }))
    }

    /// Monospace is literal: no nested markup.
    fn monospace(&mut self) -> Result<Content, ParseError> {
        let start = self.here();
        self.bump();
        let unclosed = ErrorKind::UnclosedSugar("monospace", '`');
        let mut text = String::new();

        loop {
            match self.peek() {
                None => return Err(self.error(unclosed, start)),
                Some('`') => {
                    self.bump();
                    break;
                }
                Some('\n') => {
                    self.bump();
                    if self.at_blank_line() {
                        return Err(self.error(unclosed, start));
                    }
                    text.push('\n');
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }

        Ok(Content::Sugar(Sugar::Monospace {
            text,
            loc: self.loc_from(start),
        }))
    }

    /// `!text!`, single line.
    fn verbatim(&mut self) -> Result<Content, ParseError> {
        let start = self.here();
        self.bump();
        let mut verbatim = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error(ErrorKind::UnclosedSugar("verbatim", '!'), start));
                }
                Some('!') => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    verbatim.push(c);
                    self.bump();
                }
            }
        }

        Ok(Content::Verbatim {
            verbatim,
            loc: self.loc_from(start),
        })
    }

    /// `.name[attrs]{arg}{arg}...` followed by an optional `: remainder`
    /// or, at the end of a line, `:` and indented trailer blocks.
    fn command(&mut self) -> Result<Content, ParseError> {
        let start = self.here();
        self.bump();

        let mut name = String::new();
        while let Some(c) = self
            .peek()
            .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        {
            name.push(c);
            self.bump();
        }

        let attrs = if self.peek() == Some('[') {
            self.attrs()?
        } else {
            Vec::new()
        };

        let mut args = Vec::new();
        while self.peek() == Some('{') {
            let open = self.here();
            self.bump();
            args.push(self.sequence('}', open, ErrorKind::UnclosedBrace)?);
        }

        let mut remainder = None;
        let mut trailers = Vec::new();
        let colon_follows = self.peek() == Some(':')
            && self.peek_at(1).is_none_or(|c| c == '\n' || is_inline_space(c));
        if colon_follows {
            let colon = self.here();
            self.bump();
            if self.at_blank_line() && self.closers.is_empty() {
                let colon_end = self.here();
                self.skip_line();
                trailers = self.trailers(colon, colon_end)?;
            } else {
                remainder = Some(self.remainder(colon)?);
            }
        }

        Ok(Content::Command {
            name,
            attrs,
            args,
            remainder,
            trailers,
            loc: self.loc_from(start),
        })
    }

    /// Rest of the line, stopping before any active closer.
    fn remainder(&mut self, open: (u32, u32)) -> Result<Vec<Content>, ParseError> {
        self.enter(open)?;
        let result = self.remainder_inner();
        self.leave();
        result
    }

    fn remainder_inner(&mut self) -> Result<Vec<Content>, ParseError> {
        while self.peek().is_some_and(is_inline_space) {
            self.bump();
        }

        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == '\n' || self.closers.contains(&c) {
                break;
            }
            if let Some(item) = self.content()? {
                items.push(item);
            }
            if self.col == 1 {
                break;
            }
        }
        trim_trailing_space(&mut items);
        Ok(items)
    }

    /// Blocks indented deeper than the command's line, separated by `::`
    /// lines at the command's own indentation.
    fn trailers(
        &mut self,
        colon: (u32, u32),
        colon_end: (u32, u32),
    ) -> Result<Vec<Vec<Par>>, ParseError> {
        let outer = self.line_indent;
        let mut trailers = Vec::new();

        loop {
            let indent = match self.next_indent() {
                Some(indent) if indent > outer => indent,
                _ if trailers.is_empty() => {
                    return Err(self.error_span(ErrorKind::EmptyTrailer, colon, colon_end));
                }
                _ => break,
            };

            self.enter(colon)?;
            let block = self.block(indent);
            self.leave();
            trailers.push(block?);
            self.line_indent = outer;

            if !self.at_trailer_separator(outer) {
                break;
            }
            self.skip_line();
        }
        Ok(trailers)
    }

    /// Cursor is on a `::` line at exactly `indent`.
    fn at_trailer_separator(&self, indent: usize) -> bool {
        if self.indent_width() != indent {
            return false;
        }
        let rest = self.src[self.pos..].split('\n').next().unwrap_or_default();
        rest.trim_start_matches([' ', '\t'])
            .strip_prefix("::")
            .is_some_and(|tail| tail.chars().all(is_inline_space))
    }

    fn attrs(&mut self) -> Result<Vec<Attr>, ParseError> {
        let start = self.here();
        self.bump();

        let mut raw = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => return Err(self.error(ErrorKind::UnclosedAttrs, start)),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    raw.push(c);
                    self.bump();
                }
            }
        }

        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.split_once('=') {
                Some((name, value)) => Attr {
                    name: name.trim().to_string(),
                    value: Some(value.trim().to_string()),
                },
                None => Attr {
                    name: s.to_string(),
                    value: None,
                },
            })
            .collect())
    }
}

fn is_inline_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn is_blank(line: &[Content]) -> bool {
    line.iter().all(|c| matches!(c, Content::Whitespace { .. }))
}

fn trim_trailing_space(line: &mut Vec<Content>) {
    while matches!(line.last(), Some(Content::Whitespace { .. })) {
        line.pop();
    }
}
