//! Browser playground server.
//!
//! Serves the playground page over HTTP; editor sessions connect to the
//! WebSocket server started by the actor system.

mod lifecycle;
mod response;

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::Result;
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::{compiler, config::PreviewConfig, debug, log, preview::ReadinessGate};

/// Default WebSocket port for editor sessions
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Actual WebSocket port (may differ from the configured one if it was in use)
/// Updated by coordinator after WebSocket server binds successfully
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(DEFAULT_WS_PORT);

/// Update the actual WebSocket port (called by coordinator after binding)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

/// Get the actual WebSocket port
fn get_actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server(config: &PreviewConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    set_actual_ws_port(config.serve.ws_port);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the actor system and the request loop (blocking).
    ///
    /// The backend initializes in the background; edits arriving before it
    /// is ready are dropped.
    pub fn run(self, config: Arc<PreviewConfig>) -> Result<()> {
        let backend = compiler::from_config(&config);
        let gate = ReadinessGate::new();
        debug!("compiler"; "initializing {}", backend.name());
        compiler::spawn_init(Arc::clone(&backend), gate.clone());

        let actor_handle = lifecycle::spawn_actors(config, backend, gate, self.shutdown_rx);
        run_request_loop(&self.server);
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

/// `serve` entry point.
pub fn serve(config: Arc<PreviewConfig>) -> Result<()> {
    bind_server(&config)?.run(config)
}

fn run_request_loop(server: &Server) {
    // Requests are cheap, a small pool keeps slow clients from blocking others
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        pool.spawn(move || {
            if let Err(e) = handle_request(request) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    match route(request.url()) {
        Route::Page => response::respond_page(request),
        Route::Script => response::respond_script(request, get_actual_ws_port()),
        Route::Style => response::respond_style(request),
        Route::NotFound => response::respond_not_found(request),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Page,
    Script,
    Style,
    NotFound,
}

/// Map a request URL (query string ignored) to a playground resource.
fn route(url: &str) -> Route {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path {
        "/" | "/index.html" => Route::Page,
        "/playground.js" => Route::Script,
        "/playground.css" => Route::Style,
        _ => Route::NotFound,
    }
}
