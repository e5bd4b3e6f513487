use tungstenite::protocol::Message;

use crate::actor::messages::SessionId;
use crate::reload::message::ServerMessage;

use super::WsActor;
use super::client_io::is_would_block;

impl WsActor {
    /// Send a message to one session, dropping the client if the socket failed
    pub(super) fn send_to(&self, session: SessionId, message: &ServerMessage) {
        let frame = Message::Text(message.to_json().into());

        let mut clients = self.clients.lock();
        let Some(ws) = clients.get_mut(&session) else {
            crate::debug!("ws"; "session {} is gone", session);
            return;
        };

        match ws.send(frame) {
            Ok(()) => {}
            // Frame is queued; the reader thread flushes it
            Err(ref e) if is_would_block(e) => {}
            Err(e) => {
                crate::debug!("ws"; "session {} disconnected: {}", session, e);
                clients.remove(&session);
                // PreviewActor may be waiting on this actor, so the reader
                // thread reports the close
                self.closed.lock().push(session);
            }
        }
    }
}
