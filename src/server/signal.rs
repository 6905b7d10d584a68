// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger::{self, LogWriter};

/// Notify `shutdown` once SIGTERM or SIGINT arrives (Unix only)
#[cfg(unix)]
pub fn spawn_shutdown_listener(shutdown: Arc<Notify>, log: Arc<LogWriter>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&log, &format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => log.write_access("[SIGNAL] SIGTERM received, shutting down"),
            _ = sigint.recv() => log.write_access("[SIGNAL] SIGINT received, shutting down"),
        }
        shutdown.notify_one();
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn spawn_shutdown_listener(shutdown: Arc<Notify>, log: Arc<LogWriter>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log.write_access("[SIGNAL] Ctrl+C received, shutting down");
                shutdown.notify_one();
            }
            Err(e) => logger::log_error(&log, &format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
}
