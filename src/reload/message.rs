//! Editor Session Message Protocol
//!
//! JSON messages exchanged with browser editors, tagged by `type`.
//!
//! # Client → Server
//!
//! - `hello`: first message after connecting, carries the color preference
//! - `change`: full editor text after an edit
//! - `preference`: the color preference changed
//!
//! # Server → Client
//!
//! - `connected`: session established
//! - `output`: rendered HTML and debug trace
//! - `diagnostics`: editor markers, zero or one entry
//! - `theme`: editor theme id to apply

use serde::{Deserialize, Serialize};

use crate::actor::messages::SessionId;
use crate::preview::DiagnosticRange;

/// Message received from a browser editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Hello { prefers_dark: bool },
    Change { text: String },
    Preference { prefers_dark: bool },
}

impl ClientMessage {
    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

/// Message sent to a browser editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
        session: SessionId,
    },

    /// Latest successful compile
    Output { html: String, debug: String },

    /// Replaces every marker in the editor
    Diagnostics { markers: Vec<DiagnosticRange> },

    /// Editor theme id
    Theme { id: String },
}

impl ServerMessage {
    /// Create a connected message
    pub fn connected(session: SessionId) -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
            session,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"diagnostics","markers":[]}"#.to_string())
    }
}
