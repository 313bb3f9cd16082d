// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) both request a graceful shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shutdown coordination shared by the signal task and the accept loop
#[derive(Default)]
pub struct ShutdownSignal {
    notify: Notify,
    requested: AtomicBool,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark shutdown as requested and wake the accept loop
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}

/// Spawn the task that listens for termination signals (Unix)
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<ShutdownSignal>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                crate::logger::log_error(&format!("Failed to register signal handlers: {e}"));
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => crate::logger::write_info("\n[SIGNAL] SIGTERM received"),
            _ = sigint.recv() => crate::logger::write_info("\n[SIGNAL] SIGINT received (Ctrl+C)"),
        }
        shutdown.trigger();
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<ShutdownSignal>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            crate::logger::write_info("\n[SIGNAL] Ctrl+C received");
            shutdown.trigger();
        }
    });
}
