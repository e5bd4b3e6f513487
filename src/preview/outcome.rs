//! Compile boundary result.
//!
//! Whatever the backend does (returns, errors, or panics) is folded into one
//! of two variants here, so the loop never sees control flow escaping the
//! boundary.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::extract::DiagnosticRange;
use crate::compiler::{Backend, CompileError, Compiled};

/// Result of one compile attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Rendered output and debug trace
    Success { rendered: String, debug: String },
    /// Failure message, with a structured range when the backend knows it
    Failure {
        message: String,
        range: Option<DiagnosticRange>,
    },
}

impl CompileOutcome {
    /// Run `backend` on `source` and capture the result.
    ///
    /// A panic inside the backend is treated as a failure carrying the panic
    /// payload text.
    pub fn capture(backend: &dyn Backend, source: &str) -> Self {
        match catch_unwind(AssertUnwindSafe(|| backend.compile(source))) {
            Ok(result) => result.into(),
            Err(payload) => Self::Failure {
                message: panic_message(payload.as_ref()),
                range: None,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<Compiled, CompileError>> for CompileOutcome {
    fn from(result: Result<Compiled, CompileError>) -> Self {
        match result {
            Ok(Compiled { rendered, debug }) => Self::Success { rendered, debug },
            Err(err) => Self::Failure {
                range: err.range.map(|r| DiagnosticRange {
                    message: err.message.clone(),
                    ..r
                }),
                message: err.message,
            },
        }
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "compiler panicked".to_string()
    }
}
