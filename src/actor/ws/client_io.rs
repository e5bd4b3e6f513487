use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::actor::messages::{PreviewMsg, SessionId};
use crate::reload::message::{ClientMessage, ServerMessage};

use super::{Clients, ClosedSessions, WsActor};

/// Poll interval of the reader thread
const POLL_MS: u64 = 20;

impl WsActor {
    /// Register a client whose handshake is done and greet it
    pub(super) fn add_client(&self, mut ws: WebSocket<TcpStream>) {
        let session = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));

        let connected = ServerMessage::connected(session);
        if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }

        // Now set non-blocking for polling reads
        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.insert(session, ws);
        crate::debug!("ws"; "session {} connected (total: {})", session, clients.len());
    }

    /// Background thread to read client messages (non-blocking poll)
    pub(super) fn client_reader_loop(
        clients: Clients,
        closed: ClosedSessions,
        preview_tx: mpsc::Sender<PreviewMsg>,
    ) {
        while !preview_tx.is_closed() {
            std::thread::sleep(std::time::Duration::from_millis(POLL_MS));

            let mut inbound = Vec::new();
            {
                let mut clients_guard = clients.lock();
                let mut disconnected = Vec::new();

                for (&session, ws) in clients_guard.iter_mut() {
                    // Finish frames left over from a send that hit WouldBlock
                    if let Err(e) = ws.flush()
                        && !is_would_block(&e)
                    {
                        disconnected.push(session);
                        continue;
                    }

                    // Drain everything that has arrived
                    loop {
                        match ws.read() {
                            Ok(Message::Text(text)) => {
                                match Self::parse_client_message(session, &text) {
                                    Some(msg) => inbound.push(msg),
                                    None => crate::debug!("ws"; "ignoring message from {}", session),
                                }
                            }
                            Ok(Message::Close(_)) => {
                                disconnected.push(session);
                                break;
                            }
                            Ok(_) => {}
                            Err(ref e) if is_would_block(e) => break,
                            Err(_) => {
                                disconnected.push(session);
                                break;
                            }
                        }
                    }
                }

                for session in disconnected {
                    clients_guard.remove(&session);
                    crate::debug!("ws"; "session {} disconnected", session);
                    inbound.push(PreviewMsg::Closed(session));
                }
            }
            inbound.extend(closed.lock().drain(..).map(PreviewMsg::Closed));

            // Sent outside the lock: PreviewActor may be waiting on WsActor
            for msg in inbound {
                if preview_tx.blocking_send(msg).is_err() {
                    return;
                }
            }
        }
    }

    /// Map a client text frame to a PreviewActor message
    pub(super) fn parse_client_message(session: SessionId, text: &str) -> Option<PreviewMsg> {
        Some(match ClientMessage::from_json(text)? {
            ClientMessage::Hello { prefers_dark } => PreviewMsg::Hello {
                session,
                prefers_dark,
            },
            ClientMessage::Change { text } => PreviewMsg::ContentChanged { session, text },
            ClientMessage::Preference { prefers_dark } => PreviewMsg::Preference {
                session,
                prefers_dark,
            },
        })
    }
}

pub(super) fn is_would_block(e: &tungstenite::Error) -> bool {
    matches!(e, tungstenite::Error::Io(io) if io.kind() == ErrorKind::WouldBlock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_message() {
        let s = SessionId(3);
        assert!(matches!(
            WsActor::parse_client_message(s, r#"{"type":"change","text":"x"}"#),
            Some(PreviewMsg::ContentChanged { session, text }) if session == s && text == "x"
        ));
        assert!(matches!(
            WsActor::parse_client_message(s, r#"{"type":"hello","prefers_dark":true}"#),
            Some(PreviewMsg::Hello { prefers_dark: true, .. })
        ));
        assert!(WsActor::parse_client_message(s, "{}").is_none());
    }

    #[test]
    fn test_would_block() {
        let e = tungstenite::Error::Io(std::io::Error::from(ErrorKind::WouldBlock));
        assert!(is_would_block(&e));
        assert!(!is_would_block(&tungstenite::Error::ConnectionClosed));
    }
}
