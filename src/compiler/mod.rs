//! Compile boundary.
//!
//! A [`Backend`] turns a source snapshot into rendered HTML plus a debug
//! trace, or fails with a message. Backends are selected by `[compiler]
//! backend` in the config.
//!
//! # Modules
//!
//! - `emblem` - Built-in markup language (default)
//! - `markdown` - CommonMark via pulldown-cmark
//! - `command` - Any external program speaking stdin/stdout

pub mod command;
pub mod emblem;
pub mod markdown;

use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;

use crate::config::{BackendKind, PreviewConfig};
use crate::preview::{DiagnosticRange, ReadinessGate};

/// Successful compile result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// Trusted HTML, written verbatim into the output pane
    pub rendered: String,
    /// Plain-text trace, written verbatim into the debug pane
    pub debug: String,
}

impl Compiled {
    pub fn new(rendered: impl Into<String>, debug: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            debug: debug.into(),
        }
    }
}

/// Compile failure.
///
/// `message` is the text shown to the operator and attached to the marker.
/// `range` is the structured position when the backend knows it; otherwise
/// the position is recovered from `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub range: Option<DiagnosticRange>,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            range: None,
        }
    }

    pub fn with_range(mut self, range: DiagnosticRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// A compiler the preview loop can drive.
pub trait Backend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// One-time setup before the first compile.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Compile one full snapshot of the source.
    fn compile(&self, source: &str) -> Result<Compiled, CompileError>;
}

/// Build the backend selected in config.
pub fn from_config(config: &PreviewConfig) -> Arc<dyn Backend> {
    match config.compiler.backend {
        BackendKind::Emblem => Arc::new(emblem::EmblemBackend::new()),
        BackendKind::Markdown => Arc::new(markdown::MarkdownBackend),
        BackendKind::Command => Arc::new(command::CommandBackend::new(&config.compiler.command)),
    }
}

/// Initialize `backend` in the background and open `gate` when done.
///
/// Edits arriving before the gate opens are dropped by the preview loop.
pub fn spawn_init(
    backend: Arc<dyn Backend>,
    gate: ReadinessGate,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || match backend.initialize() {
        Ok(()) => {
            gate.mark_ready();
            crate::log!("compiler"; "{} ready", backend.name());
        }
        Err(e) => {
            crate::log!("error"; "{} failed to initialize: {:#}", backend.name(), e);
        }
    })
}

/// Initialize `backend` on the current thread and open `gate`.
pub fn init_blocking(backend: &dyn Backend, gate: &ReadinessGate) -> Result<()> {
    backend.initialize()?;
    gate.mark_ready();
    crate::debug!("compiler"; "{} ready", backend.name());
    Ok(())
}
