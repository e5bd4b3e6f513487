//! Readiness gate for the compile boundary.
//!
//! Starts closed. Compiler initialization opens it exactly once; it never
//! closes again. Every clone observes the same flag, so the initializer
//! thread and the preview loop can each hold their own handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, monotonic "compiler is initialized" flag.
#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    ready: Arc<AtomicBool>,
}

impl ReadinessGate {
    /// Create a closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate that is already open (one-shot commands, tests).
    pub fn opened() -> Self {
        let gate = Self::new();
        gate.mark_ready();
        gate
    }

    /// Check whether the compiler may be invoked.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Open the gate.
    ///
    /// Idempotent. Returns `true` only for the call that performed the
    /// false -> true transition.
    pub fn mark_ready(&self) -> bool {
        !self.ready.swap(true, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_starts_closed() {
        let gate = ReadinessGate::new();
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_mark_ready_is_idempotent() {
        let gate = ReadinessGate::new();
        assert!(gate.mark_ready());
        assert!(!gate.mark_ready());
        assert!(gate.is_ready());
    }

    #[test]
    fn test_clones_share_state() {
        let gate = ReadinessGate::new();
        let init_handle = gate.clone();

        let thread = std::thread::spawn(move || init_handle.mark_ready());
        assert!(thread.join().unwrap());

        assert!(gate.is_ready());
    }

    #[test]
    fn test_opened() {
        assert!(ReadinessGate::opened().is_ready());
    }
}
