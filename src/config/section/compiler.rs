//! `[compiler]` section configuration.
//!
//! Selects the backend that turns editor text into HTML.
//!
//! # Example
//!
//! ```toml
//! [compiler]
//! backend = "command"                 # emblem (default), markdown, command
//! command = ["emblem", "--html", "-"] # program + args, source on stdin
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Available compiler backends.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Built-in emblem markup parser
    #[default]
    Emblem,
    /// CommonMark via pulldown-cmark
    Markdown,
    /// External program, see `compiler.command`
    Command,
}

/// Compiler backend settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub backend: BackendKind,

    /// Program and arguments for the `command` backend.
    pub command: Vec<String>,
}

impl CompilerConfig {
    const COMMAND: FieldPath = FieldPath::new("compiler.command");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.backend == BackendKind::Command
            && self.command.first().is_none_or(|p| p.trim().is_empty())
        {
            diag.error_with_hint(
                Self::COMMAND,
                "the command backend needs a program to run",
                "e.g. command = [\"emblem\", \"--html\", \"-\"]",
            );
        }
    }
}
