//! Editor session transport.
//!
//! Browser editors talk to the preview loop over WebSocket:
//!
//! ```text
//! Browser --[hello/change/preference]--> WsActor --> PreviewActor
//! Browser <--[output/diagnostics/theme]-- WsActor <--------+
//! ```
//!
//! # Modules
//!
//! - `message` - JSON messages in both directions
//! - `server` - WebSocket acceptor handing connections to WsActor

pub mod message;
pub mod server;
