//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! WsActor/FsActor --PreviewMsg--> PreviewActor --WsMsg--> WsActor
//! ```

use std::fmt;
use std::net::TcpStream;

use serde::{Deserialize, Serialize};
use tungstenite::WebSocket;

use crate::reload::message::ServerMessage;

/// Identifies one editing session (a browser tab or a watched file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// PreviewActor Messages
// =============================================================================

/// Messages to Preview Actor
#[derive(Debug)]
pub enum PreviewMsg {
    /// Session started, with its initial color preference
    Hello { session: SessionId, prefers_dark: bool },
    /// Full editor text after an edit
    ContentChanged { session: SessionId, text: String },
    /// Host color preference changed
    Preference { session: SessionId, prefers_dark: bool },
    /// Session went away
    Closed(SessionId),
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Deliver a message to one session
    Send {
        session: SessionId,
        message: ServerMessage,
    },
    /// Add a client whose handshake has completed
    AddClient(WebSocket<TcpStream>),
    /// Shutdown
    Shutdown,
}
