//! WebSocket Server for Editor Sessions
//!
//! Accepts connections on a background thread. Each handshake runs on its
//! own short-lived thread under a read timeout, and only finished sockets are
//! handed to WsActor, which owns the session from then on.

use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Time a client gets to complete the WebSocket handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Start the WebSocket acceptor, returning the port actually bound.
pub fn start_ws_server(
    interface: IpAddr,
    base_port: u16,
    ws_tx: mpsc::Sender<WsMsg>,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            if crate::core::is_shutdown() {
                break;
            }
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("ws"; "client connected: {}", addr);
                    if ws_tx.is_closed() {
                        crate::debug!("ws"; "actor gone, stopping acceptor");
                        break;
                    }
                    spawn_handshake(stream, addr, ws_tx.clone(), HANDSHAKE_TIMEOUT);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("ws"; "accept error: {}", e);
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    });

    Ok(actual_port)
}

/// Handshake off the acceptor thread, then hand the socket to WsActor.
fn spawn_handshake(
    stream: TcpStream,
    addr: SocketAddr,
    ws_tx: mpsc::Sender<WsMsg>,
    timeout: Duration,
) {
    std::thread::spawn(move || match handshake(stream, timeout) {
        Ok(ws) => {
            let _ = ws_tx.blocking_send(WsMsg::AddClient(ws));
        }
        Err(e) => crate::log!("ws"; "{}: {:#}", addr, e),
    });
}

/// Server side of the WebSocket handshake, giving up after `timeout` of
/// silence from the client.
fn handshake(stream: TcpStream, timeout: Duration) -> Result<WebSocket<TcpStream>> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(timeout))?;
    let ws = tungstenite::accept(stream).map_err(|e| anyhow!("handshake failed: {e}"))?;
    ws.get_ref().set_read_timeout(None)?;
    Ok(ws)
}

/// Try binding to port, retry with incremented port if in use
pub(crate) fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
