//! Compile-and-annotate loop.
//!
//! One `PreviewLoop` per editing session. Each call to
//! [`PreviewLoop::on_content_changed`] runs to completion before returning,
//! so two compile attempts of the same session never overlap.

use std::sync::Arc;

use super::extract::{DiagnosticRange, extract};
use super::gate::ReadinessGate;
use super::outcome::CompileOutcome;
use super::surface::PreviewSurface;
use crate::compiler::Backend;

/// State currently shown on the surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Published {
    /// Last successful rendered output
    pub output: Option<String>,
    /// Debug trace of the last success
    pub debug: Option<String>,
    /// Zero or one live marker
    pub diagnostic: Option<DiagnosticRange>,
}

/// Change-triggered compile loop for a single session.
pub struct PreviewLoop {
    gate: ReadinessGate,
    backend: Arc<dyn Backend>,
    published: Published,
}

impl PreviewLoop {
    pub fn new(gate: ReadinessGate, backend: Arc<dyn Backend>) -> Self {
        Self {
            gate,
            backend,
            published: Published::default(),
        }
    }

    /// What this session currently shows.
    pub fn published(&self) -> &Published {
        &self.published
    }

    /// Handle one "content changed" notification.
    ///
    /// Returns the outcome, or `None` when the edit was dropped because the
    /// compiler is not ready yet.
    pub fn on_content_changed(
        &mut self,
        text: &str,
        surface: &mut dyn PreviewSurface,
    ) -> Option<CompileOutcome> {
        if !self.gate.is_ready() {
            crate::debug!("preview"; "compiler not ready, dropping edit");
            return None;
        }

        let outcome = CompileOutcome::capture(self.backend.as_ref(), text);
        self.apply(&outcome, surface);
        Some(outcome)
    }

    fn apply(&mut self, outcome: &CompileOutcome, surface: &mut dyn PreviewSurface) {
        match outcome {
            CompileOutcome::Success { rendered, debug } => {
                surface.render(rendered, debug);
                surface.set_diagnostics(&[]);
                self.published.output = Some(rendered.clone());
                self.published.debug = Some(debug.clone());
                self.published.diagnostic = None;
            }
            CompileOutcome::Failure { message, range } => {
                crate::debug!("compile"; "{}", message);
                surface.report_failure(message);

                let diagnostic = range.clone().or_else(|| extract(message));
                match &diagnostic {
                    Some(d) => surface.set_diagnostics(std::slice::from_ref(d)),
                    None => surface.set_diagnostics(&[]),
                }
                self.published.diagnostic = diagnostic;
            }
        }
    }
}
