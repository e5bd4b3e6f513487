//! Parsed document tree.

use std::fmt;

/// Source span, 1-based, end column exclusive.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub first_line: u32,
    pub first_column: u32,
    pub last_line: u32,
    pub last_column: u32,
}

impl Location {
    pub const fn new(first: (u32, u32), last: (u32, u32)) -> Self {
        Self {
            first_line: first.0,
            first_column: first.1,
            last_line: last.0,
            last_column: last.1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.first_line, self.first_column, self.last_line, self.last_column
        )
    }
}

// Compact form keeps the debug trace readable
impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// A whole source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub pars: Vec<Par>,
}

/// A paragraph: consecutive non-blank lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Par {
    pub lines: Vec<Vec<Content>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Command {
        name: String,
        attrs: Vec<Attr>,
        /// Braced `{...}` arguments
        args: Vec<Vec<Content>>,
        /// `.name: rest of the line`
        remainder: Option<Vec<Content>>,
        /// Indented blocks after `.name:`, separated by `::` lines
        trailers: Vec<Vec<Par>>,
        loc: Location,
    },
    Word {
        word: String,
        loc: Location,
    },
    Whitespace {
        whitespace: String,
        loc: Location,
    },
    Dash {
        dash: Dash,
        loc: Location,
    },
    /// `~`, a non-breaking space
    Glue {
        glue: String,
        loc: Location,
    },
    /// `!text!`, copied without markup
    Verbatim {
        verbatim: String,
        loc: Location,
    },
    Sugar(Sugar),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sugar {
    Italic { arg: Vec<Content>, loc: Location },
    Bold { arg: Vec<Content>, loc: Location },
    Monospace { text: String, loc: Location },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    Hyphen,
    En,
    Em,
}

impl Dash {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hyphen => "-",
            Self::En => "\u{2013}",
            Self::Em => "\u{2014}",
        }
    }
}

/// `key=value` or bare `flag` inside `.cmd[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
}
