//! Server lifecycle management.

use std::{
    net::SocketAddr,
    sync::Arc,
    thread::{self, JoinHandle},
};

use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use tiny_http::Server;

use crate::{
    actor::Coordinator,
    compiler::Backend,
    config::PreviewConfig,
    core::{register_server, register_shutdown},
    log,
    preview::ReadinessGate,
};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(
    interface: std::net::IpAddr,
    base_port: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Register server for graceful shutdown.
///
/// When Ctrl+C is pressed, the handler installed in main() unblocks the
/// server and notifies the actors.
pub fn register_server_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    register_shutdown(shutdown_tx);
    register_server(server);
}

/// Spawn the actor system on its own thread and runtime.
pub fn spawn_actors(
    config: Arc<PreviewConfig>,
    backend: Arc<dyn Backend>,
    gate: ReadinessGate,
    shutdown_rx: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || run_actor_system(config, backend, gate, shutdown_rx))
}

fn run_actor_system(
    config: Arc<PreviewConfig>,
    backend: Arc<dyn Backend>,
    gate: ReadinessGate,
    shutdown_rx: Receiver<()>,
) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    rt.block_on(async {
        let coordinator =
            Coordinator::new(config, backend, gate).with_shutdown_signal(shutdown_rx);
        if let Err(e) = coordinator.run_sessions().await {
            log!("actor"; "error: {}", e);
        }
    });
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(std::time::Duration::from_millis(50));
    }
}
