// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::time::Duration;

use crate::serve::ResponseOptions;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub serve: ServeConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// What to serve and how to describe it
#[derive(Debug, Deserialize, Clone)]
pub struct ServeConfig {
    /// Directory served as the filesystem root
    pub root: String,
    /// Fallback resource for directories and missing paths; empty disables it
    pub index_file: String,
    pub max_age_secs: u64,
    pub immutable: bool,
    pub compress: bool,
}

impl ServeConfig {
    pub fn index_file(&self) -> Option<&str> {
        Some(self.index_file.as_str()).filter(|name| !name.is_empty())
    }

    /// Base options applied to every served file
    pub fn response_options(&self) -> ResponseOptions {
        let mut options = ResponseOptions::new().compress(self.compress);
        if self.max_age_secs > 0 {
            options = options.max_age(Duration::from_secs(self.max_age_secs));
        }
        if self.immutable {
            options = options.immutable(true);
        }
        options
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (default, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound on one connection's lifetime, in seconds
    pub request_timeout: u64,
}

impl PerformanceConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
