//! `build` command: compile a file once.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::PreviewConfig;
use crate::preview::{CompileOutcome, ReadinessGate, extract};
use crate::{compiler, debug, log};

/// Compile `file` and write the HTML to `output`, or stdout when absent.
pub fn build(config: &PreviewConfig, file: &Path, output: Option<&Path>) -> Result<()> {
    let backend = compiler::from_config(config);
    let gate = ReadinessGate::new();
    compiler::init_blocking(backend.as_ref(), &gate)
        .with_context(|| format!("{} backend failed to initialize", backend.name()))?;

    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    match CompileOutcome::capture(backend.as_ref(), &source) {
        CompileOutcome::Success { rendered, debug } => {
            debug!("build"; "debug trace:\n{}", debug);
            match output {
                Some(path) => {
                    std::fs::write(path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    log!("build"; "{} -> {}", file.display(), path.display());
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(rendered.as_bytes())?;
                    stdout.flush()?;
                }
            }
            Ok(())
        }
        CompileOutcome::Failure { message, range } => {
            bail!("{}", diagnostic_line(file, &message, range.or_else(|| extract(&message))))
        }
    }
}

/// `file:line:col: message`, or `file: message` without a position.
fn diagnostic_line(
    file: &Path,
    message: &str,
    range: Option<crate::preview::DiagnosticRange>,
) -> String {
    match range {
        Some(r) => format!(
            "{}:{}:{}: {}",
            file.display(),
            r.start_line,
            r.start_column,
            message
        ),
        None => format!("{}: {}", file.display(), message),
    }
}
