//! Log writer module
//!
//! Thread-safe log writing to files or stdout/stderr. Each line is written
//! under a lock, so concurrent requests never interleave partial lines.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use super::LogSink;

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(File),
}

/// Thread-safe log writer with separate access and error targets
pub struct LogWriter {
    access: Mutex<LogTarget>,
    error: Mutex<LogTarget>,
}

impl LogWriter {
    /// Create a log writer; `None` paths fall back to stdout/stderr
    pub fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stdout,
        };
        let error = match error_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stderr,
        };
        Ok(Self {
            access: Mutex::new(access),
            error: Mutex::new(error),
        })
    }

    /// Writer logging to stdout and stderr
    pub fn stdio() -> Self {
        Self {
            access: Mutex::new(LogTarget::Stdout),
            error: Mutex::new(LogTarget::Stderr),
        }
    }

    pub fn write_access(&self, message: &str) {
        let mut target = self.access.lock().unwrap_or_else(PoisonError::into_inner);
        write_to_target(&mut target, message);
    }

    pub fn write_error(&self, message: &str) {
        let mut target = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        write_to_target(&mut target, message);
    }
}

impl LogSink for LogWriter {
    fn record(&self, line: &str) {
        self.write_access(line);
    }

    fn record_error(&self, line: &str) {
        self.write_error(line);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

fn write_to_target(target: &mut LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => {
            println!("{message}");
        }
        LogTarget::Stderr => {
            eprintln!("{message}");
        }
        LogTarget::File(file) => {
            // One write call per line keeps appends whole
            let _ = file.write_all(format!("{message}\n").as_bytes());
        }
    }
}
