//! Actor System for Live Preview
//!
//! Message-passing concurrency around the preview loop:
//!
//! ```text
//! WsActor (browser sessions) --+                 +--> WsActor
//!                              +--> PreviewActor +
//! FsActor (watched file) ------+   (compile)     +--> file outlet
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `preview` - The single event loop owning every session's PreviewLoop
//! - `ws` - WebSocket editor sessions
//! - `fs` - File watcher turning saves into edits
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod preview;
pub mod ws;

pub use coordinator::Coordinator;
pub use preview::Outlet;
