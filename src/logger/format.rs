//! Access log format module
//!
//! Supports several line formats:
//! - `default` (`[status] METHOD uri (n bytes, elapsed)`)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;
use std::time::Duration;

use crate::http::RequestContext;

/// Longest request identifier written to the log
pub const MAX_URI_LOG_LEN: usize = 120;

/// Access log record for one handled request
#[derive(Debug, Clone)]
pub struct AccessRecord {
    /// Client address, `-` when unknown
    pub remote_addr: Option<String>,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    /// Request identifier, truncated to [`MAX_URI_LOG_LEN`]
    pub uri: String,
    pub status: u16,
    pub body_bytes: u64,
    pub elapsed: Duration,
    /// Error detail for failed requests
    pub error: Option<String>,
}

impl AccessRecord {
    /// Create a record for `req` stamped with the current time
    pub fn new(req: &RequestContext, elapsed: Duration) -> Self {
        Self {
            remote_addr: req.remote_addr.map(|addr| addr.ip().to_string()),
            time: Local::now(),
            method: req.method.to_string(),
            uri: truncate_uri(&req.uri, MAX_URI_LOG_LEN),
            status: 200,
            body_bytes: 0,
            elapsed,
            error: None,
        }
    }

    /// Format the record according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "default" => self.format_default(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn format_default(&self) -> String {
        match &self.error {
            Some(error) => format!(
                "[{}] {} {} ({:?}) ERROR: {error}",
                self.status, self.method, self.uri, self.elapsed
            ),
            None => format!(
                "[{}] {} {} ({} bytes, {:?})",
                self.status, self.method, self.uri, self.body_bytes, self.elapsed
            ),
        }
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}\" {} {}",
            self.remote_addr.as_deref().unwrap_or("-"),
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.uri,
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "uri": self.uri,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "request_time_us": u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX),
            "error": self.error,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client IP address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request URI with query string
    /// - `$request_time` - Processing time in seconds (3 decimal places)
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Response body size
    /// - `$error` - Error detail, `-` on success
    fn format_custom(&self, pattern: &str) -> String {
        let mut result = pattern.to_string();

        result = result.replace("$remote_addr", self.remote_addr.as_deref().unwrap_or("-"));
        result = result.replace(
            "$time_local",
            &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
        );
        result = result.replace("$time_iso8601", &self.time.to_rfc3339());
        result = result.replace(
            "$request_time",
            &format!("{:.3}", self.elapsed.as_secs_f64()),
        );
        result = result.replace("$request_method", &self.method);
        result = result.replace("$request_uri", &self.uri);
        result = result.replace("$status", &self.status.to_string());
        result = result.replace("$body_bytes_sent", &self.body_bytes.to_string());
        result = result.replace("$error", self.error.as_deref().unwrap_or("-"));

        result
    }
}

/// Truncate `uri` to at most `max` characters, ending in `...` when cut
pub fn truncate_uri(uri: &str, max: usize) -> String {
    if uri.chars().count() <= max {
        return uri.to_string();
    }
    let kept: String = uri.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
