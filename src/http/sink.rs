//! Response target module
//!
//! [`ResponseSink`] collects status, headers and body the way a streaming
//! response writer would: the head is committed by the first body write or an
//! explicit [`ResponseSink::write_head`], after which status and headers are
//! frozen. It is finally turned into a hyper response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS,
};
use hyper::{Response, StatusCode};
use std::io::{self, Write};

/// Buffered response target with at-most-once head semantics
#[derive(Debug, Default)]
pub struct ResponseSink {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (replace) a header; fails once the head has been committed
    pub fn set_header(&mut self, name: HeaderName, value: &str) -> io::Result<()> {
        if self.is_committed() {
            return Err(io::Error::other(format!(
                "cannot set {name} after the response head was sent"
            )));
        }
        let value = HeaderValue::from_bytes(value.as_bytes()).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("{name}: {e}"))
        })?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Commit the status line; returns false if it was already committed
    pub fn write_head(&mut self, status: StatusCode) -> bool {
        if self.is_committed() {
            return false;
        }
        self.status = Some(status);
        true
    }

    #[inline]
    pub const fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    /// Status that will be sent (200 until committed otherwise)
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replace the response with a plain-text error
    ///
    /// Every header set for the abandoned body is dropped, caching headers
    /// included. Returns false and leaves the response untouched when the head
    /// was already committed.
    pub fn write_error(&mut self, status: StatusCode, message: &str) -> bool {
        if self.is_committed() {
            return false;
        }
        self.headers.clear();
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.headers
            .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        self.status = Some(status);
        self.body.clear();
        self.body.extend_from_slice(message.as_bytes());
        self.body.push(b'\n');
        true
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl Write for ResponseSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.is_committed() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, LAST_MODIFIED};

    #[test]
    fn test_first_write_commits_ok() {
        let mut sink = ResponseSink::new();
        sink.set_header(CONTENT_TYPE, "text/plain").unwrap();
        sink.write_all(b"hello").unwrap();
        assert!(sink.is_committed());
        assert!(!sink.write_head(StatusCode::NOT_FOUND));
        assert!(sink.set_header(CONTENT_LENGTH, "5").is_err());

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_error_replaces_uncommitted_response() {
        let mut sink = ResponseSink::new();
        sink.set_header(CONTENT_LENGTH, "100").unwrap();
        sink.set_header(CONTENT_TYPE, "video/mp4").unwrap();
        sink.set_header(CACHE_CONTROL, "public, max-age=31536000, immutable").unwrap();
        sink.set_header(LAST_MODIFIED, "Tue, 02 Jan 2024 03:04:05 GMT").unwrap();
        assert!(sink.write_error(StatusCode::NOT_FOUND, "missing"));
        assert_eq!(sink.status(), StatusCode::NOT_FOUND);
        assert_eq!(sink.header(&CONTENT_LENGTH), None);
        assert_eq!(sink.header(&CACHE_CONTROL), None);
        assert_eq!(sink.header(&LAST_MODIFIED), None);
        assert_eq!(sink.header(&CONTENT_TYPE), Some("text/plain; charset=utf-8"));
        assert_eq!(sink.header(&X_CONTENT_TYPE_OPTIONS), Some("nosniff"));
        assert_eq!(sink.body(), b"missing\n");
    }

    #[test]
    fn test_error_after_commit_is_ignored() {
        let mut sink = ResponseSink::new();
        assert!(sink.write_head(StatusCode::PARTIAL_CONTENT));
        assert!(!sink.write_error(StatusCode::INTERNAL_SERVER_ERROR, "late"));
        assert_eq!(sink.status(), StatusCode::PARTIAL_CONTENT);
        assert!(sink.body().is_empty());
    }

    #[test]
    fn test_rejects_control_characters() {
        let mut sink = ResponseSink::new();
        let err = sink.set_header(CONTENT_TYPE, "text/plain\r\nX: y").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
