//! Error position extraction.
//!
//! Compilers report failures as free-form text. When the text contains
//! `found at A:B:C:D` the four integers are the 1-based start line, start
//! column, end line and end column of the offending range.
//!
//! The match is purely textual: degenerate or out-of-bounds ranges are passed
//! through untouched and left to the editor surface to clamp.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static POSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"found at ([0-9]+):([0-9]+):([0-9]+):([0-9]+)").unwrap());

/// A single inline annotation on the editing surface.
///
/// Field names on the wire follow the editor's marker convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRange {
    #[serde(rename = "startLineNumber")]
    pub start_line: u32,
    pub start_column: u32,
    #[serde(rename = "endLineNumber")]
    pub end_line: u32,
    pub end_column: u32,
    /// Full failure message, not just the matched fragment.
    pub message: String,
}

impl DiagnosticRange {
    pub fn new(
        (start_line, start_column): (u32, u32),
        (end_line, end_column): (u32, u32),
        message: impl Into<String>,
    ) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            message: message.into(),
        }
    }
}

/// Recover a diagnostic range from a failure message.
///
/// Returns `None` when the pattern is absent, or when one of the integers
/// does not fit a `u32` coordinate.
pub fn extract(message: &str) -> Option<DiagnosticRange> {
    let caps = POSITION.captures(message)?;
    let coord = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

    Some(DiagnosticRange {
        start_line: coord(1)?,
        start_column: coord(2)?,
        end_line: coord(3)?,
        end_column: coord(4)?,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_range() {
        let range = extract("X found at 3:5:3:9").unwrap();
        assert_eq!(range.start_line, 3);
        assert_eq!(range.start_column, 5);
        assert_eq!(range.end_line, 3);
        assert_eq!(range.end_column, 9);
        assert_eq!(range.message, "X found at 3:5:3:9");
    }

    #[test]
    fn test_extract_keeps_full_message() {
        let message = "main.em: unclosed brace found at 2:1:4:7\nhelp: add a '}'";
        let range = extract(message).unwrap();
        assert_eq!(range.message, message);
        assert_eq!((range.start_line, range.end_column), (2, 7));
    }

    #[test]
    fn test_extract_absent() {
        assert_eq!(extract("unexpected token"), None);
        assert_eq!(extract("found at 1:2:3"), None);
        assert_eq!(extract("found at a:b:c:d"), None);
    }

    #[test]
    fn test_extract_passes_degenerate_ranges() {
        // end before start, zero column: not validated
        let range = extract("found at 9:0:2:1").unwrap();
        assert_eq!(
            (range.start_line, range.start_column, range.end_line, range.end_column),
            (9, 0, 2, 1)
        );
    }

    #[test]
    fn test_extract_first_match_wins() {
        let range = extract("found at 1:1:1:2 then found at 5:5:5:6").unwrap();
        assert_eq!(range.start_line, 1);
    }

    #[test]
    fn test_extract_overflow() {
        assert_eq!(extract("found at 99999999999:1:1:1"), None);
    }

    #[test]
    fn test_marker_serialization() {
        let json = serde_json::to_string(&DiagnosticRange::new((2, 3), (2, 7), "boom")).unwrap();
        assert_eq!(
            json,
            r#"{"startLineNumber":2,"startColumn":3,"endLineNumber":2,"endColumn":7,"message":"boom"}"#
        );
    }
}
