use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::task::JoinHandle;

/// Poll interval for the shutdown signal
const POLL_MS: u64 = 100;

/// Wait until shutdown is signalled or any actor stops on its own.
pub(super) async fn wait_for_stop(shutdown_rx: Option<Receiver<()>>, handles: &[JoinHandle<()>]) {
    loop {
        if let Some(rx) = &shutdown_rx
            && rx.try_recv().is_ok()
        {
            crate::debug!("actor"; "shutdown signal received");
            return;
        }
        if handles.iter().any(JoinHandle::is_finished) {
            crate::debug!("actor"; "actor stopped");
            return;
        }
        tokio::time::sleep(Duration::from_millis(POLL_MS)).await;
    }
}

/// Give actors a moment to wind down after their Shutdown message.
pub(super) async fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
    }
}
