//! What the preview loop writes to.

use super::extract::DiagnosticRange;

/// Output side of an editing session.
///
/// Both calls fully replace what was shown before: `render` overwrites the
/// output and debug panes, `set_diagnostics` replaces every marker (the loop
/// never passes more than one).
pub trait PreviewSurface {
    /// Write trusted HTML and the plain debug trace verbatim.
    fn render(&mut self, html: &str, debug: &str);

    /// Replace all inline markers.
    fn set_diagnostics(&mut self, diagnostics: &[DiagnosticRange]);

    /// Full text of a failed compile, reported before its markers.
    fn report_failure(&mut self, _message: &str) {}
}

/// Surface that records every call, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub renders: Vec<(String, String)>,
    pub diagnostics: Vec<Vec<DiagnosticRange>>,
    pub failures: Vec<String>,
}

#[cfg(test)]
impl PreviewSurface for RecordingSurface {
    fn render(&mut self, html: &str, debug: &str) {
        self.renders.push((html.to_string(), debug.to_string()));
    }

    fn set_diagnostics(&mut self, diagnostics: &[DiagnosticRange]) {
        self.diagnostics.push(diagnostics.to_vec());
    }

    fn report_failure(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }
}

#[cfg(test)]
impl RecordingSurface {
    pub fn is_untouched(&self) -> bool {
        self.renders.is_empty() && self.diagnostics.is_empty() && self.failures.is_empty()
    }

    pub fn last_diagnostics(&self) -> Option<&[DiagnosticRange]> {
        self.diagnostics.last().map(Vec::as_slice)
    }
}
