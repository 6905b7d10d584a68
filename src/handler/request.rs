//! Request handling wrapper
//!
//! Times one serving operation, turns an unstarted failure into an error
//! response, and reports exactly one log line per request.

use hyper::StatusCode;
use std::sync::Arc;
use std::time::Instant;

use crate::error::status_code;
use crate::http::{RequestContext, ResponseSink};
use crate::logger::{AccessRecord, LogSink};
use crate::serve::Outcome;

/// Observe-and-report wrapper around a serving operation
#[derive(Clone)]
pub struct Handler {
    log: Arc<dyn LogSink>,
    format: String,
    access_log: bool,
}

impl Handler {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self {
            log,
            format: "default".to_string(),
            access_log: true,
        }
    }

    /// Access log line format, see [`AccessRecord::format`]
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Disable logging of successful requests; failures are always logged
    #[must_use]
    pub const fn with_access_log(mut self, enabled: bool) -> Self {
        self.access_log = enabled;
        self
    }

    /// Run `op` once against `sink` and report the outcome
    ///
    /// If `op` failed before writing any body bytes, the error is written as a
    /// plain-text response with its classified status. Failures after the body
    /// started are only logged.
    pub fn handle<F>(&self, sink: &mut ResponseSink, req: &RequestContext, op: F) -> Outcome
    where
        F: FnOnce(&mut ResponseSink) -> Outcome,
    {
        let started = Instant::now();
        let outcome = op(sink);
        let mut record = AccessRecord::new(req, started.elapsed());

        match outcome.error.as_ref().filter(|_| outcome.written == 0) {
            Some(err) => {
                let status = status_code(Some(err));
                let message = err.to_string();
                sink.write_error(status, &message);
                record.status = status.as_u16();
                record.error = Some(message);
                self.log.record_error(&record.format(&self.format));
            }
            None => {
                record.status = StatusCode::OK.as_u16();
                record.body_bytes = outcome.written;
                if self.access_log {
                    self.log.record(&record.format(&self.format));
                }
            }
        }
        outcome
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("format", &self.format)
            .field("access_log", &self.access_log)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServeError;
    use crate::serve::{serve_bytes, serve_source, ByteSource, ResponseOptions};
    use hyper::header::{ACCEPT_RANGES, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_TYPE};
    use hyper::Method;
    use std::io::{self, Read, Write};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Captured {
        lines: Mutex<Vec<(bool, String)>>,
    }

    impl LogSink for Captured {
        fn record(&self, line: &str) {
            self.lines.lock().unwrap().push((false, line.to_string()));
        }

        fn record_error(&self, line: &str) {
            self.lines.lock().unwrap().push((true, line.to_string()));
        }
    }

    impl Captured {
        fn take(&self) -> Vec<(bool, String)> {
            std::mem::take(&mut *self.lines.lock().unwrap())
        }
    }

    fn handler() -> (Handler, Arc<Captured>) {
        let captured = Arc::new(Captured::default());
        let log: Arc<dyn LogSink> = captured.clone();
        (Handler::new(log), captured)
    }

    #[test]
    fn test_success_is_logged_with_bytes() {
        let (handler, log) = handler();
        let req = RequestContext::new(Method::GET, "/hello.txt");
        let mut sink = ResponseSink::new();
        let outcome = handler.handle(&mut sink, &req, |sink| {
            serve_bytes(sink, &req, &b"hello"[..], ResponseOptions::new())
        });
        assert_eq!(outcome.written, 5);
        assert_eq!(sink.body(), b"hello");

        let lines = log.take();
        assert_eq!(lines.len(), 1);
        let (is_error, line) = &lines[0];
        assert!(!is_error);
        assert!(line.starts_with("[200] GET /hello.txt (5 bytes, "), "{line}");
    }

    #[test]
    fn test_error_writes_body_and_logs() {
        let (handler, log) = handler();
        let req = RequestContext::new(Method::GET, "/missing");
        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |_| {
            Outcome::failed(ServeError::not_found("missing"))
        });
        assert_eq!(sink.status(), StatusCode::NOT_FOUND);
        assert_eq!(sink.body(), b"open missing: file does not exist\n");

        let lines = log.take();
        assert_eq!(lines.len(), 1);
        let (is_error, line) = &lines[0];
        assert!(is_error);
        assert!(line.starts_with("[404] GET /missing ("), "{line}");
        assert!(line.ends_with(") ERROR: open missing: file does not exist"), "{line}");
    }

    #[test]
    fn test_method_not_allowed_status() {
        let (handler, _log) = handler();
        let req = RequestContext::new(Method::POST, "/");
        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |_| Outcome::failed(ServeError::MethodNotAllowed));
        assert_eq!(sink.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(sink.body(), b"method not allowed\n");
    }

    #[test]
    fn test_failure_after_body_is_not_rewritten() {
        let (handler, log) = handler();
        let req = RequestContext::new(Method::GET, "/stream");
        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |sink| {
            sink.write_all(b"partial").unwrap();
            Outcome::partial(7, io::Error::other("reset").into())
        });
        assert_eq!(sink.status(), StatusCode::OK);
        assert_eq!(sink.body(), b"partial");

        let lines = log.take();
        assert!(lines[0].1.starts_with("[200] GET /stream (7 bytes, "));
    }

    #[test]
    fn test_unreadable_compressed_body_gets_error_response() {
        struct Denied;

        impl Read for Denied {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            }
        }

        let (handler, log) = handler();
        let req = RequestContext::new(Method::GET, "/big.txt").with_accept_encoding("gzip");
        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |sink| {
            let opts = ResponseOptions::new().size(5000).compress(true);
            serve_source(sink, &req, ByteSource::sequential(Denied), opts)
        });
        assert_eq!(sink.status(), StatusCode::FORBIDDEN);
        assert_eq!(sink.header(&CONTENT_TYPE), Some("text/plain; charset=utf-8"));
        assert_eq!(sink.header(&CONTENT_ENCODING), None);
        assert!(log.take()[0].1.starts_with("[403] GET /big.txt ("));
    }

    #[test]
    fn test_error_response_drops_caching_headers() {
        let (handler, _log) = handler();
        let req = RequestContext::new(Method::GET, "/clip").with_range("bytes=5000-");
        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |sink| {
            serve_bytes(sink, &req, vec![0u8; 100], ResponseOptions::new().immutable(true))
        });
        assert_eq!(sink.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sink.header(&CACHE_CONTROL), None);
        assert_eq!(sink.header(&ACCEPT_RANGES), None);
    }

    #[test]
    fn test_head_success_with_zero_bytes() {
        let (handler, log) = handler();
        let req = RequestContext::new(Method::HEAD, "/");
        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |sink| {
            serve_bytes(sink, &req, &b"hello"[..], ResponseOptions::new())
        });
        assert_eq!(sink.status(), StatusCode::OK);
        assert!(sink.body().is_empty());
        assert!(log.take()[0].1.starts_with("[200] HEAD / (0 bytes, "));
    }

    #[test]
    fn test_long_uri_truncated_in_log() {
        let (handler, log) = handler();
        let target = format!("/{}", "a".repeat(500));
        let req = RequestContext::new(Method::GET, &target);
        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |_| Outcome::failed(ServeError::not_found("a")));
        let line = &log.take()[0].1;
        let uri = line.split(' ').nth(2).unwrap();
        assert_eq!(uri.chars().count(), 120);
        assert!(uri.ends_with("..."));
    }

    #[test]
    fn test_access_log_disabled_keeps_errors() {
        let (handler, log) = handler();
        let handler = handler.with_access_log(false);
        let req = RequestContext::new(Method::GET, "/");
        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |_| Outcome::ok(3));
        assert!(log.take().is_empty());

        let mut sink = ResponseSink::new();
        handler.handle(&mut sink, &req, |_| Outcome::failed(ServeError::MethodNotAllowed));
        assert_eq!(log.take().len(), 1);
    }
}
