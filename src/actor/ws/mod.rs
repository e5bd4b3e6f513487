//! WebSocket Actor - Editor Session Connections
//!
//! This actor is responsible for:
//! - Accepting editor connections and assigning each a `SessionId`
//! - Delivering surface updates to the session they belong to
//! - Forwarding editor messages (hello, change, preference) to PreviewActor
//!
//! # Architecture
//!
//! ```text
//! PreviewActor --[Send{session}]--> WsActor --> Client(session)
//!      ^                                            |
//!      +------[Hello/ContentChanged/Preference]-----+
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::{PreviewMsg, SessionId, WsMsg};

type Clients = Arc<Mutex<FxHashMap<SessionId, WebSocket<TcpStream>>>>;

/// Sessions dropped by delivery, reported to PreviewActor by the reader thread
type ClosedSessions = Arc<Mutex<Vec<SessionId>>>;

/// WebSocket Actor - manages editor sessions
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    /// Editor messages go here
    preview_tx: mpsc::Sender<PreviewMsg>,
    /// Connected clients (shared for delivery + read thread)
    clients: Clients,
    closed: ClosedSessions,
    next_session: AtomicU64,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, preview_tx: mpsc::Sender<PreviewMsg>) -> Self {
        Self {
            rx,
            preview_tx,
            clients: Arc::new(Mutex::new(FxHashMap::default())),
            closed: Arc::new(Mutex::new(Vec::new())),
            next_session: AtomicU64::new(1),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        let closed = Arc::clone(&self.closed);
        let preview_tx = self.preview_tx.clone();
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader, closed, preview_tx);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Send { session, message } => {
                    self.send_to(session, &message);
                }

                WsMsg::AddClient(ws) => {
                    self.add_client(ws);
                }

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    let mut clients = self.clients.lock();
                    for (_, mut ws) in clients.drain() {
                        let _ = ws.close(None);
                        let _ = ws.flush();
                    }
                    break;
                }
            }
        }
    }
}
