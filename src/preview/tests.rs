//! End-to-end behavior of the preview loop against a scripted backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::surface::RecordingSurface;
use super::*;
use crate::compiler::{Backend, CompileError, Compiled};

/// Backend answering from a fixed script, counting compile calls.
struct Scripted {
    calls: AtomicUsize,
}

impl Scripted {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Backend for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn compile(&self, source: &str) -> Result<Compiled, CompileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match source {
            "ok" => Ok(Compiled::new("<p>ok</p>", "trace1")),
            "fixed" => Ok(Compiled::new("<p>fixed</p>", "trace2")),
            "bad" => Err(CompileError::new("Parse error found at 2:3:2:7")),
            "structured" => Err(CompileError::new("bad thing").with_range(DiagnosticRange::new(
                (4, 1),
                (4, 2),
                "ignored",
            ))),
            "panic" => panic!("backend exploded"),
            _ => Err(CompileError::new("unexpected token")),
        }
    }
}

fn ready_loop(backend: Arc<Scripted>) -> PreviewLoop {
    PreviewLoop::new(ReadinessGate::opened(), backend)
}

#[test]
fn test_not_ready_drops_edit() {
    let backend = Scripted::new();
    let gate = ReadinessGate::new();
    let mut lp = PreviewLoop::new(gate.clone(), backend.clone());
    let mut surface = RecordingSurface::default();

    assert!(lp.on_content_changed("ok", &mut surface).is_none());
    assert!(surface.is_untouched());
    assert_eq!(backend.calls(), 0);
    assert_eq!(lp.published(), &Published::default());

    // dropped edits are not replayed once the gate opens
    assert!(gate.mark_ready());
    assert!(surface.is_untouched());
    assert_eq!(backend.calls(), 0);
}

#[test]
fn test_success_publishes_output() {
    let backend = Scripted::new();
    let mut lp = ready_loop(backend);
    let mut surface = RecordingSurface::default();

    let outcome = lp.on_content_changed("ok", &mut surface).unwrap();
    assert!(outcome.is_success());

    assert_eq!(
        surface.renders,
        vec![("<p>ok</p>".to_string(), "trace1".to_string())]
    );
    assert_eq!(surface.last_diagnostics(), Some(&[][..]));
    assert_eq!(lp.published().output.as_deref(), Some("<p>ok</p>"));
    assert_eq!(lp.published().debug.as_deref(), Some("trace1"));
    assert!(lp.published().diagnostic.is_none());
}

#[test]
fn test_success_is_idempotent() {
    let mut lp = ready_loop(Scripted::new());
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("ok", &mut surface);
    let first = lp.published().clone();
    lp.on_content_changed("ok", &mut surface);

    assert_eq!(lp.published(), &first);
    assert_eq!(surface.renders[0], surface.renders[1]);
}

#[test]
fn test_failure_with_position_keeps_output() {
    let mut lp = ready_loop(Scripted::new());
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("ok", &mut surface);
    let outcome = lp.on_content_changed("bad", &mut surface).unwrap();
    assert!(!outcome.is_success());

    let expected = DiagnosticRange::new((2, 3), (2, 7), "Parse error found at 2:3:2:7");
    assert_eq!(surface.last_diagnostics(), Some(&[expected.clone()][..]));
    assert_eq!(surface.renders.len(), 1);
    assert_eq!(lp.published().output.as_deref(), Some("<p>ok</p>"));
    assert_eq!(lp.published().debug.as_deref(), Some("trace1"));
    assert_eq!(lp.published().diagnostic, Some(expected));
}

#[test]
fn test_failure_without_position_clears_marker() {
    let mut lp = ready_loop(Scripted::new());
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("bad", &mut surface);
    assert_eq!(surface.last_diagnostics().map(<[_]>::len), Some(1));

    lp.on_content_changed("garbage", &mut surface);
    assert_eq!(surface.last_diagnostics(), Some(&[][..]));
    assert!(lp.published().diagnostic.is_none());
    assert!(lp.published().output.is_none());
    assert!(surface.renders.is_empty());
}

#[test]
fn test_failure_text_reaches_surface() {
    let mut lp = ready_loop(Scripted::new());
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("garbage", &mut surface);
    lp.on_content_changed("ok", &mut surface);
    lp.on_content_changed("bad", &mut surface);

    // success reports nothing
    assert_eq!(
        surface.failures,
        ["unexpected token", "Parse error found at 2:3:2:7"]
    );
}

#[test]
fn test_success_after_failure_recovers() {
    let mut lp = ready_loop(Scripted::new());
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("bad", &mut surface);
    lp.on_content_changed("fixed", &mut surface);

    assert_eq!(surface.last_diagnostics(), Some(&[][..]));
    assert_eq!(lp.published().output.as_deref(), Some("<p>fixed</p>"));
    assert_eq!(lp.published().debug.as_deref(), Some("trace2"));
    assert!(lp.published().diagnostic.is_none());
}

#[test]
fn test_structured_range_wins_over_text() {
    let mut lp = ready_loop(Scripted::new());
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("structured", &mut surface);

    // range from the backend, message always the full failure text
    let expected = DiagnosticRange::new((4, 1), (4, 2), "bad thing");
    assert_eq!(lp.published().diagnostic, Some(expected));
}

#[test]
fn test_backend_panic_is_contained() {
    let mut lp = ready_loop(Scripted::new());
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("ok", &mut surface);
    let outcome = lp.on_content_changed("panic", &mut surface).unwrap();

    match outcome {
        CompileOutcome::Failure { message, range } => {
            assert!(message.contains("backend exploded"));
            assert!(range.is_none());
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(surface.last_diagnostics(), Some(&[][..]));
    assert_eq!(lp.published().output.as_deref(), Some("<p>ok</p>"));

    // the loop keeps working afterwards
    assert!(lp.on_content_changed("fixed", &mut surface).unwrap().is_success());
}

#[test]
fn test_session_scenario() {
    let backend = Scripted::new();
    let gate = ReadinessGate::new();
    let themes = ThemeSync::default();
    let mut lp = PreviewLoop::new(gate.clone(), backend.clone());
    let mut surface = RecordingSurface::default();

    // A: before readiness nothing happens
    lp.on_content_changed("ok", &mut surface);
    assert!(surface.is_untouched());

    // B: first compile after readiness
    gate.mark_ready();
    lp.on_content_changed("ok", &mut surface);
    assert_eq!(surface.renders.last().unwrap().0, "<p>ok</p>");
    assert_eq!(surface.last_diagnostics(), Some(&[][..]));

    // C: error at 2:3..2:7
    lp.on_content_changed("bad", &mut surface);
    let marker = &surface.last_diagnostics().unwrap()[0];
    assert_eq!(
        (marker.start_line, marker.start_column, marker.end_line, marker.end_column),
        (2, 3, 2, 7)
    );
    assert_eq!(marker.message, "Parse error found at 2:3:2:7");
    assert_eq!(lp.published().output.as_deref(), Some("<p>ok</p>"));

    // D: preference flips to dark, independent of edits
    let theme = themes.on_preference_changed(true);
    assert_eq!(theme, ThemeId::Dark);
    assert_eq!(themes.name(theme), "vs-dark");
    assert_eq!(backend.calls(), 2);
}

#[test]
fn test_emblem_backend_through_loop() {
    let backend = Arc::new(crate::compiler::emblem::EmblemBackend::new());
    let mut lp = PreviewLoop::new(ReadinessGate::opened(), backend);
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("some *bold", &mut surface);
    let marker = lp.published().diagnostic.clone().unwrap();
    assert_eq!((marker.start_line, marker.start_column), (1, 6));
    assert!(marker.message.starts_with("main.em: "));

    lp.on_content_changed("some *bold*", &mut surface);
    assert_eq!(
        lp.published().output.as_deref(),
        Some("<p>some <b>bold</b></p>")
    );
    assert!(lp.published().diagnostic.is_none());
}

#[test]
fn test_emblem_deep_nesting_fails_without_crashing() {
    let backend = Arc::new(crate::compiler::emblem::EmblemBackend::new());
    let mut lp = PreviewLoop::new(ReadinessGate::opened(), backend);
    let mut surface = RecordingSurface::default();

    lp.on_content_changed("ok", &mut surface);
    lp.on_content_changed(&".a{".repeat(10_000), &mut surface);

    let marker = lp.published().diagnostic.clone().unwrap();
    assert!(marker.message.contains("nesting deeper than"));
    assert_eq!((marker.start_line, marker.start_column), (1, 387));
    assert_eq!(lp.published().output.as_deref(), Some("<p>ok</p>"));
}
