//! Logger module
//!
//! Provides logging utilities for the server:
//! - The [`LogSink`] capability the request handler reports to
//! - Access log records with multiple formats
//! - Server lifecycle, warning and error lines
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{truncate_uri, AccessRecord, MAX_URI_LOG_LEN};
pub use writer::LogWriter;

use crate::config::Config;
use std::net::SocketAddr;

/// Destination for log lines
///
/// Implementations must write each line whole, even when called from many
/// threads at once.
pub trait LogSink: Send + Sync {
    fn record(&self, line: &str);

    /// Line describing a failed request; defaults to [`LogSink::record`]
    fn record_error(&self, line: &str) {
        self.record(line);
    }
}

pub fn log_server_start(log: &LogWriter, addr: &SocketAddr, config: &Config) {
    log.write_access("======================================");
    log.write_access("Server started successfully");
    log.write_access(&format!("Listening on: http://{addr}"));
    log.write_access(&format!("Serving: {}", config.serve.root));
    match config.serve.index_file() {
        Some(index) => log.write_access(&format!("Index file: {index}")),
        None => log.write_access("Index file: (none)"),
    }
    if let Some(workers) = config.server.workers {
        log.write_access(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        log.write_access(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log.write_access(&format!("Error log: {path}"));
    }
    log.write_access("======================================");
}

pub fn log_connection_error(log: &LogWriter, err: &impl std::fmt::Debug) {
    log.write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(log: &LogWriter, message: &str) {
    log.write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(log: &LogWriter, message: &str) {
    log.write_error(&format!("[WARN] {message}"));
}

pub fn log_shutdown(log: &LogWriter) {
    log.write_access("[Shutdown] Stopped accepting connections");
}
