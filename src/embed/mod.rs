//! Embedded static resources for the browser playground.
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{PLAYGROUND_JS, PlaygroundVars};
//!
//! let js = PLAYGROUND_JS.render(&PlaygroundVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for playground.js.
    pub struct PlaygroundVars {
        pub ws_port: u16,
    }

    impl TemplateVars for PlaygroundVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__PREVIEW_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Variables for playground.html.
    pub struct PageVars<'a> {
        pub version: &'a str,
    }

    impl TemplateVars for PageVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__VERSION__", self.version)
        }
    }

    /// Playground page: editor, output and debug panes.
    pub const PLAYGROUND_HTML: Template<PageVars<'static>> =
        Template::new(include_str!("serve/playground.html"));

    /// Editor wiring with WebSocket port injection.
    pub const PLAYGROUND_JS: Template<PlaygroundVars> =
        Template::new(include_str!("serve/playground.js"));

    pub const PLAYGROUND_CSS: &str = include_str!("serve/playground.css");
}
