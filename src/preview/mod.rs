//! Preview Loop - compile on every edit, annotate failures inline
//!
//! The editing surface raises "content changed"; the loop checks the
//! readiness gate, compiles the snapshot and reconciles what the surface
//! shows:
//!
//! ```text
//! ContentChanged --> ReadinessGate --> Backend::compile --> CompileOutcome
//!                        (drop)                               |
//!                                   +-------------------------+
//!                                   v                         v
//!                          render(output, debug)      extract(message)
//!                          set_diagnostics([])        set_diagnostics([0..=1])
//! ```
//!
//! # Modules
//!
//! - `gate` - Monotonic readiness flag shared with compiler initialization
//! - `extract` - Recovers a source range from a failure message
//! - `outcome` - Two-variant result captured at the compile boundary
//! - `annotate` - The compile-and-annotate loop itself
//! - `surface` - What the loop writes to (output, debug, markers)
//! - `theme` - Light/dark theme synchronization

pub mod annotate;
pub mod extract;
pub mod gate;
pub mod outcome;
pub mod surface;
pub mod theme;

#[cfg(test)]
mod tests;

pub use annotate::{Published, PreviewLoop};
pub use extract::{DiagnosticRange, extract};
pub use gate::ReadinessGate;
pub use outcome::CompileOutcome;
pub use surface::PreviewSurface;
pub use theme::{ThemeId, ThemeSync};
