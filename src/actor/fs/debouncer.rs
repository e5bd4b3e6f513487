//! Save coalescing for the watched file.
//!
//! A single save reaches notify as a burst of events (truncate and write,
//! or remove and create for atomic saves). The 50 ms quiet window only merges
//! that burst into one read of the file. It is not a rate limit: saves
//! further apart than the window each produce their own edit, and the
//! window restarts on every event rather than capping compile frequency.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub(super) const DEBOUNCE_MS: u64 = 50;

/// Collapses the burst of notify events a single save produces.
///
/// Pure timing: only tracks whether the watched file was touched and when.
pub(super) struct Debouncer {
    /// File being watched (absolute)
    target: PathBuf,
    pub(super) pending: bool,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(target: PathBuf) -> Self {
        Self {
            target,
            pending: false,
            last_event: None,
        }
    }

    /// Record a notify event if it writes the target file.
    ///
    /// Removals are ignored: atomic saves remove then recreate the file, and
    /// the recreate event is what carries the new content.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        match event.kind {
            EventKind::Create(_) => {}
            EventKind::Modify(modify) => {
                // Metadata-only changes (mtime/atime/chmod) carry no new text
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
            }
            _ => return,
        }

        if !event.paths.iter().any(|p| self.is_target(p)) {
            return;
        }

        crate::debug!("watch"; "raw notify: {:?}", event.kind);
        self.pending = true;
        self.last_event = Some(Instant::now());
    }

    fn is_target(&self, path: &Path) -> bool {
        path == self.target
    }

    /// Take the pending change once the debounce window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.pending = false;
        self.last_event = None;
        true
    }

    pub(super) fn is_ready(&self) -> bool {
        match self.last_event {
            Some(last) => self.pending && last.elapsed() >= Duration::from_millis(DEBOUNCE_MS),
            None => false,
        }
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}
