//! External program backend.
//!
//! The source is piped to the program's stdin:
//! - exit 0: stdout is the rendered HTML, stderr the debug trace
//! - otherwise: stderr (or the exit status) is the failure message
//!
//! Programs that want inline markers print `found at L1:C1:L2:C2` somewhere
//! in their error text.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use anyhow::{Context, Result, bail};

use super::{Backend, CompileError, Compiled};

/// Runs a configured program once per compile.
#[derive(Debug)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    /// Program path resolved during initialization
    resolved: OnceLock<PathBuf>,
}

impl CommandBackend {
    /// Create from a command array (e.g., `["emblem", "--html"]`).
    pub fn new(command: &[String]) -> Self {
        let mut iter = command.iter().cloned();
        Self {
            program: iter.next().unwrap_or_default(),
            args: iter.collect(),
            resolved: OnceLock::new(),
        }
    }

    fn program_path(&self) -> PathBuf {
        self.resolved
            .get()
            .cloned()
            .unwrap_or_else(|| PathBuf::from(&self.program))
    }

    fn run(&self, source: &str) -> Result<std::process::Output> {
        let name = &self.program;
        let mut child = Command::new(self.program_path())
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn `{name}`"))?;

        // Programs may exit without reading their input
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(source.as_bytes())
            && e.kind() != ErrorKind::BrokenPipe
        {
            return Err(e).with_context(|| format!("Failed to write stdin to `{name}`"));
        }

        child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for `{name}`"))
    }
}

impl Backend for CommandBackend {
    fn name(&self) -> &'static str {
        "command"
    }

    fn initialize(&self) -> Result<()> {
        if self.program.is_empty() {
            bail!("no compiler command configured");
        }
        let path = which::which(&self.program)
            .with_context(|| format!("`{}` not found in PATH", self.program))?;
        crate::debug!("compiler"; "using {}", path.display());
        let _ = self.resolved.set(path);
        Ok(())
    }

    fn compile(&self, source: &str) -> Result<Compiled, CompileError> {
        let output = self
            .run(source)
            .map_err(|e| CompileError::new(format!("{e:#}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = stderr.trim();
            return Err(CompileError::new(if message.is_empty() {
                format!("`{}` failed: {}", self.program, output.status)
            } else {
                message.to_string()
            }));
        }

        let rendered = String::from_utf8(output.stdout).map_err(|e| {
            CompileError::new(format!("`{}` produced invalid UTF-8: {e}", self.program))
        })?;

        Ok(Compiled {
            rendered,
            debug: stderr.into_owned(),
        })
    }
}
