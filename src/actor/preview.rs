//! Preview Actor - the single logical event loop
//!
//! Owns one [`PreviewLoop`] per session and processes edit, hello and
//! preference events strictly one at a time. Compiles run on the blocking
//! pool, but the actor awaits each one before taking the next message, so two
//! compile attempts are never in flight.
//!
//! ```text
//! PreviewMsg --> PreviewActor --(Outbox surface)--> Outlet
//!                  |    ^                          (WsActor / files)
//!                  v    |
//!             spawn_blocking(PreviewLoop::on_content_changed)
//! ```

use std::future::Future;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::messages::{PreviewMsg, SessionId, WsMsg};
use crate::compiler::Backend;
use crate::preview::{DiagnosticRange, PreviewLoop, PreviewSurface, ReadinessGate, ThemeSync};
use crate::reload::message::ServerMessage;

/// Where surface updates for a session end up.
pub trait Outlet: Send + 'static {
    /// Deliver one update. Returns `false` once the receiving side is gone.
    fn deliver(
        &mut self,
        session: SessionId,
        message: ServerMessage,
    ) -> impl Future<Output = bool> + Send;

    /// Full text of a failed compile, before its diagnostics are delivered.
    fn report_failure(&mut self, _session: SessionId, _message: &str) {}
}

impl Outlet for mpsc::Sender<WsMsg> {
    async fn deliver(&mut self, session: SessionId, message: ServerMessage) -> bool {
        self.send(WsMsg::Send { session, message }).await.is_ok()
    }
}

/// Surface that buffers updates as protocol messages.
#[derive(Debug, Default)]
struct Outbox {
    messages: Vec<ServerMessage>,
    failure: Option<String>,
}

impl PreviewSurface for Outbox {
    fn render(&mut self, html: &str, debug: &str) {
        self.messages.push(ServerMessage::Output {
            html: html.to_string(),
            debug: debug.to_string(),
        });
    }

    fn set_diagnostics(&mut self, diagnostics: &[DiagnosticRange]) {
        self.messages.push(ServerMessage::Diagnostics {
            markers: diagnostics.to_vec(),
        });
    }

    fn report_failure(&mut self, message: &str) {
        self.failure = Some(message.to_string());
    }
}

/// Preview Actor - compiles edits and synchronizes themes for all sessions
pub struct PreviewActor<O> {
    rx: mpsc::Receiver<PreviewMsg>,
    outlet: O,
    gate: ReadinessGate,
    backend: Arc<dyn Backend>,
    themes: ThemeSync,
    sessions: FxHashMap<SessionId, PreviewLoop>,
}

impl<O: Outlet> PreviewActor<O> {
    pub fn new(
        rx: mpsc::Receiver<PreviewMsg>,
        outlet: O,
        gate: ReadinessGate,
        backend: Arc<dyn Backend>,
        themes: ThemeSync,
    ) -> Self {
        Self {
            rx,
            outlet,
            gate,
            backend,
            themes,
            sessions: FxHashMap::default(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            let delivered = match msg {
                PreviewMsg::Hello {
                    session,
                    prefers_dark,
                } => {
                    if !self.sessions.contains_key(&session) {
                        let preview = self.new_loop();
                        self.sessions.insert(session, preview);
                    }
                    let theme = self.themes.initial_theme(prefers_dark);
                    self.send_theme(session, theme).await
                }

                PreviewMsg::ContentChanged { session, text } => {
                    self.content_changed(session, text).await
                }

                PreviewMsg::Preference {
                    session,
                    prefers_dark,
                } => {
                    let theme = self.themes.on_preference_changed(prefers_dark);
                    self.send_theme(session, theme).await
                }

                PreviewMsg::Closed(session) => {
                    self.sessions.remove(&session);
                    crate::debug!("preview"; "session {} closed ({} open)", session, self.sessions.len());
                    true
                }

                PreviewMsg::Shutdown => {
                    crate::debug!("preview"; "shutting down");
                    break;
                }
            };

            if !delivered {
                crate::debug!("preview"; "outlet closed, stopping");
                break;
            }
        }
    }

    fn new_loop(&self) -> PreviewLoop {
        PreviewLoop::new(self.gate.clone(), Arc::clone(&self.backend))
    }

    async fn content_changed(&mut self, session: SessionId, text: String) -> bool {
        if !self.gate.is_ready() {
            crate::debug!("preview"; "compiler not ready, dropping edit from {}", session);
            return true;
        }

        let mut preview = match self.sessions.remove(&session) {
            Some(preview) => preview,
            None => self.new_loop(),
        };

        let joined = tokio::task::spawn_blocking(move || {
            let mut outbox = Outbox::default();
            preview.on_content_changed(&text, &mut outbox);
            (preview, outbox)
        })
        .await;

        let outbox = match joined {
            Ok((preview, outbox)) => {
                self.sessions.insert(session, preview);
                outbox
            }
            Err(e) => {
                crate::log!("preview"; "compile task for {} aborted: {}", session, e);
                return true;
            }
        };

        if let Some(failure) = &outbox.failure {
            self.outlet.report_failure(session, failure);
        }
        for message in outbox.messages {
            if !self.outlet.deliver(session, message).await {
                return false;
            }
        }
        true
    }

    async fn send_theme(&mut self, session: SessionId, theme: crate::preview::ThemeId) -> bool {
        let id = self.themes.name(theme).to_string();
        crate::debug!("preview"; "theme {} for {}", id, session);
        self.outlet
            .deliver(session, ServerMessage::Theme { id })
            .await
    }
}
