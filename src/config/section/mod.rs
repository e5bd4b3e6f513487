//! Configuration section definitions.
//!
//! Each module corresponds to a section in `preview.toml`:
//!
//! | Module     | TOML Section   | Purpose                           |
//! |------------|----------------|-----------------------------------|
//! | `compiler` | `[compiler]`   | Backend selection                 |
//! | `serve`    | `[serve]`      | Playground HTTP/WebSocket ports   |
//! | `theme`    | `[theme]`      | Editor theme ids                  |

mod compiler;
mod serve;
mod theme;

pub use compiler::{BackendKind, CompilerConfig};
pub use serve::ServeConfig;
pub use theme::ThemeConfig;
