//! Actor Coordinator - Wires up the Preview Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Wires up actors for the chosen host (browser sessions or a file)
//! - Runs them until shutdown

mod runtime;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::{PreviewMsg, SessionId, WsMsg};
use super::preview::{Outlet, PreviewActor};
use super::ws::WsActor;
use crate::compiler::Backend;
use crate::config::PreviewConfig;
use crate::preview::{ReadinessGate, ThemeSync};

const CHANNEL_BUFFER: usize = 32;

/// Session id of the single file in watch mode
pub const FILE_SESSION: SessionId = SessionId(0);

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<PreviewConfig>,
    backend: Arc<dyn Backend>,
    gate: ReadinessGate,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<PreviewConfig>, backend: Arc<dyn Backend>, gate: ReadinessGate) -> Self {
        Self {
            config,
            backend,
            gate,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    fn preview_actor<O: Outlet>(
        &self,
        rx: mpsc::Receiver<PreviewMsg>,
        outlet: O,
    ) -> PreviewActor<O> {
        PreviewActor::new(
            rx,
            outlet,
            self.gate.clone(),
            Arc::clone(&self.backend),
            ThemeSync::new(&self.config.theme),
        )
    }

    /// Browser sessions over WebSocket.
    pub async fn run_sessions(mut self) -> Result<()> {
        let (preview_tx, preview_rx) = mpsc::channel::<PreviewMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let serve = &self.config.serve;
        let port = crate::reload::server::start_ws_server(serve.interface, serve.ws_port, ws_tx.clone())?;
        if port != serve.ws_port {
            crate::log!("ws"; "port {} in use, using {} instead", serve.ws_port, port);
        }
        crate::cli::serve::set_actual_ws_port(port);
        crate::debug!("ws"; "ws://{}:{}", serve.interface, port);

        let preview = self.preview_actor(preview_rx, ws_tx.clone());
        let ws = WsActor::new(ws_rx, preview_tx.clone());

        crate::debug!("actor"; "start");
        let handles = vec![tokio::spawn(preview.run()), tokio::spawn(ws.run())];
        runtime::wait_for_stop(self.shutdown_rx.take(), &handles).await;

        let _ = preview_tx.send(PreviewMsg::Shutdown).await;
        let _ = ws_tx.send(WsMsg::Shutdown).await;
        runtime::join_all(handles).await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }

    /// A single file on disk, updates written through `outlet`.
    pub async fn run_file<O: Outlet>(mut self, file: &Path, outlet: O) -> Result<()> {
        let (preview_tx, preview_rx) = mpsc::channel::<PreviewMsg>(CHANNEL_BUFFER);

        let fs = FsActor::new(file, FILE_SESSION, preview_tx.clone())?;
        let preview = self.preview_actor(preview_rx, outlet);

        crate::debug!("actor"; "start");
        let handles = vec![tokio::spawn(preview.run()), tokio::spawn(fs.run())];
        runtime::wait_for_stop(self.shutdown_rx.take(), &handles).await;

        let _ = preview_tx.send(PreviewMsg::Shutdown).await;
        for handle in &handles[1..] {
            handle.abort();
        }
        runtime::join_all(handles).await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
