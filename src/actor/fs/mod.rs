//! FileSystem Actor
//!
//! Turns a file on disk into an editing surface: every save becomes a
//! "content changed" notification carrying the file's current text.
//!
//! ```text
//! Watcher (parent dir) → Debouncer (pure timing) → read file → PreviewMsg
//! ```

mod debouncer;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::{PreviewMsg, SessionId};
use debouncer::Debouncer;

/// FileSystem Actor - watches one source file
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Absolute path of the watched file
    file: PathBuf,
    session: SessionId,
    preview_tx: mpsc::Sender<PreviewMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    /// Start watching `file` immediately.
    ///
    /// Events buffer in the notify channel until [`FsActor::run`] starts, so
    /// saves made while the compiler initializes are not missed.
    pub fn new(
        file: &Path,
        session: SessionId,
        preview_tx: mpsc::Sender<PreviewMsg>,
    ) -> Result<Self> {
        let file = resolve(file)?;
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .context("watched file has no parent directory")?;

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // Watch the directory: editors often replace the file on save
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;

        Ok(Self {
            notify_rx,
            watcher,
            debouncer: Debouncer::new(file.clone()),
            file,
            session,
            preview_tx,
        })
    }

    /// Run the actor event loop
    ///
    /// The file's content at start is sent as the first snapshot.
    pub async fn run(self) {
        let Self {
            notify_rx,
            watcher,
            file,
            session,
            preview_tx,
            mut debouncer,
        } = self;
        // Keep the watcher alive for the whole loop
        let _watcher = watcher;

        if !send_snapshot(&file, session, &preview_tx).await {
            return;
        }

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if debouncer.take_if_ready()
                        && !send_snapshot(&file, session, &preview_tx).await
                    {
                        break;
                    }
                }
            }
        }
    }
}

/// Absolute path with symlinks in the directory resolved, matching what
/// notify reports for the watched directory.
fn resolve(file: &Path) -> Result<PathBuf> {
    let file = std::path::absolute(file)
        .with_context(|| format!("invalid path {}", file.display()))?;
    let name = file
        .file_name()
        .with_context(|| format!("{} is not a file", file.display()))?;
    let dir = file.parent().unwrap_or(Path::new("/"));
    let dir = dir
        .canonicalize()
        .with_context(|| format!("directory {} does not exist", dir.display()))?;
    Ok(dir.join(name))
}

/// Read the file and hand its text to PreviewActor.
///
/// Returns `false` once PreviewActor is gone.
async fn send_snapshot(
    file: &Path,
    session: SessionId,
    preview_tx: &mpsc::Sender<PreviewMsg>,
) -> bool {
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            crate::log!("watch"; "cannot read {}: {}", file.display(), e);
            return true;
        }
    };

    crate::debug!("watch"; "changed: {}", file.display());
    preview_tx
        .send(PreviewMsg::ContentChanged { session, text })
        .await
        .is_ok()
}
