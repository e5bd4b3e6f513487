//! `watch` command: a file on disk as the editing surface.
//!
//! Each save recompiles the file. Rendered HTML and the debug trace go to
//! files next to it; diagnostics go to the terminal status block.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actor::{Coordinator, Outlet, messages::SessionId};
use crate::config::PreviewConfig;
use crate::logger::{status_error, status_success};
use crate::preview::{DiagnosticRange, ReadinessGate};
use crate::reload::message::ServerMessage;
use crate::{compiler, log};

/// Watch `file` until Ctrl+C.
pub fn watch(config: Arc<PreviewConfig>, file: &Path, output: Option<&Path>) -> Result<()> {
    let backend = compiler::from_config(&config);
    let gate = ReadinessGate::new();
    compiler::init_blocking(backend.as_ref(), &gate)
        .with_context(|| format!("{} backend failed to initialize", backend.name()))?;

    let outlet = FileOutlet::new(file, output);
    log!("watch"; "{} -> {}", file.display(), outlet.output.display());

    let (shutdown_tx, shutdown_rx) = crossbeam::channel::unbounded();
    crate::core::register_shutdown(shutdown_tx);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(
        Coordinator::new(config, backend, gate)
            .with_shutdown_signal(shutdown_rx)
            .run_file(file, outlet),
    )
}

/// `<path><suffix>`, keeping the original extension.
fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Outlet writing surface updates to disk and the terminal.
pub struct FileOutlet {
    source: String,
    output: PathBuf,
    debug: PathBuf,
    /// Output was just written; the next empty marker list means success
    rendered: bool,
    /// Text of the failure whose markers come next
    failure: Option<String>,
}

/// What the status block shows after a compile.
#[derive(Debug, PartialEq, Eq)]
enum Status {
    Compiled(String),
    Failed { summary: String, detail: String },
}

impl FileOutlet {
    pub fn new(source: &Path, output: Option<&Path>) -> Self {
        let output = output.map_or_else(|| append_suffix(source, ".html"), Path::to_path_buf);
        Self {
            source: source.display().to_string(),
            debug: append_suffix(&output, ".debug.txt"),
            output,
            rendered: false,
            failure: None,
        }
    }

    fn status_for(&mut self, markers: &[DiagnosticRange]) -> Status {
        let rendered = std::mem::take(&mut self.rendered);
        let failure = self.failure.take();
        match markers.first() {
            Some(m) => Status::Failed {
                summary: format!("{}:{}:{}", self.source, m.start_line, m.start_column),
                detail: m.message.clone(),
            },
            None if rendered => Status::Compiled(format!("compiled {}", self.source)),
            None => Status::Failed {
                summary: format!("{}: compile failed", self.source),
                detail: failure.unwrap_or_default(),
            },
        }
    }

    fn write_output(&self, html: &str, debug: &str) -> Result<()> {
        std::fs::write(&self.output, html)
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        std::fs::write(&self.debug, debug)
            .with_context(|| format!("failed to write {}", self.debug.display()))
    }
}

impl Outlet for FileOutlet {
    async fn deliver(&mut self, _: SessionId, message: ServerMessage) -> bool {
        match message {
            ServerMessage::Output { html, debug } => match self.write_output(&html, &debug) {
                Ok(()) => self.rendered = true,
                Err(e) => log!("error"; "{:#}", e),
            },
            ServerMessage::Diagnostics { markers } => match self.status_for(&markers) {
                Status::Compiled(message) => status_success(&message),
                Status::Failed { summary, detail } => status_error(&summary, &detail),
            },
            ServerMessage::Connected { .. } | ServerMessage::Theme { .. } => {}
        }
        true
    }

    fn report_failure(&mut self, _: SessionId, message: &str) {
        self.failure = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_paths() {
        let outlet = FileOutlet::new(Path::new("docs/notes.em"), None);
        assert_eq!(outlet.output, PathBuf::from("docs/notes.em.html"));
        assert_eq!(outlet.debug, PathBuf::from("docs/notes.em.html.debug.txt"));

        let outlet = FileOutlet::new(Path::new("notes.em"), Some(Path::new("out/index.html")));
        assert_eq!(outlet.output, PathBuf::from("out/index.html"));
        assert_eq!(outlet.debug, PathBuf::from("out/index.html.debug.txt"));
    }

    #[tokio::test]
    async fn test_output_written_and_kept_on_failure() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("notes.em");
        let mut outlet = FileOutlet::new(&source, None);

        let output = ServerMessage::Output {
            html: "<p>ok</p>".into(),
            debug: "Document".into(),
        };
        assert!(outlet.deliver(SessionId(0), output).await);
        assert!(outlet.rendered);
        assert!(
            outlet
                .deliver(SessionId(0), ServerMessage::Diagnostics { markers: vec![] })
                .await
        );
        assert!(!outlet.rendered);

        let marker = DiagnosticRange::new((2, 3), (2, 7), "unexpected '}' found at 2:3:2:7");
        let failure = ServerMessage::Diagnostics {
            markers: vec![marker],
        };
        assert!(outlet.deliver(SessionId(0), failure).await);

        let html = std::fs::read_to_string(dir.path().join("notes.em.html")).unwrap();
        let debug = std::fs::read_to_string(dir.path().join("notes.em.html.debug.txt")).unwrap();
        assert_eq!(html, "<p>ok</p>");
        assert_eq!(debug, "Document");
    }

    #[test]
    fn test_failure_without_position_shows_message() {
        let mut outlet = FileOutlet::new(Path::new("notes.em"), None);
        outlet.report_failure(SessionId(0), "compiler exited with status 2");

        assert_eq!(
            outlet.status_for(&[]),
            Status::Failed {
                summary: "notes.em: compile failed".into(),
                detail: "compiler exited with status 2".into(),
            }
        );
        // consumed by the status it belongs to
        assert!(outlet.failure.is_none());
    }

    #[test]
    fn test_status_for_marker_and_success() {
        let mut outlet = FileOutlet::new(Path::new("notes.em"), None);
        outlet.report_failure(SessionId(0), "main.em: unexpected '}' found at 2:3:2:7");
        let marker = DiagnosticRange::new((2, 3), (2, 7), "main.em: unexpected '}' found at 2:3:2:7");
        assert_eq!(
            outlet.status_for(&[marker]),
            Status::Failed {
                summary: "notes.em:2:3".into(),
                detail: "main.em: unexpected '}' found at 2:3:2:7".into(),
            }
        );

        outlet.rendered = true;
        assert_eq!(
            outlet.status_for(&[]),
            Status::Compiled("compiled notes.em".into())
        );
    }

    #[tokio::test]
    async fn test_unwritable_output_keeps_running() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing/out.html");
        let mut outlet = FileOutlet::new(Path::new("notes.em"), Some(&missing));

        let output = ServerMessage::Output {
            html: "<p>ok</p>".into(),
            debug: String::new(),
        };
        assert!(outlet.deliver(SessionId(0), output).await);
        assert!(!outlet.rendered);
    }
}
