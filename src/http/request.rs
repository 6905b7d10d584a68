//! Request context module
//!
//! Owned snapshot of the request fields the response engine consults, so the
//! engine can run away from the connection task.

use hyper::header::{HeaderMap, ACCEPT_ENCODING, RANGE};
use hyper::{Method, Request};
use std::net::SocketAddr;

/// Request context encapsulating information needed for response writing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Path and query as received, used to identify the request in logs
    pub uri: String,
    pub path: String,
    pub range: Option<String>,
    pub accept_encoding: Option<String>,
    pub remote_addr: Option<SocketAddr>,
}

impl RequestContext {
    /// Build a context from a method and a request target such as `/a/b?c=d`
    pub fn new(method: Method, target: &str) -> Self {
        let path = target.split_once('?').map_or(target, |(path, _)| path);
        Self {
            method,
            uri: target.to_string(),
            path: path.to_string(),
            range: None,
            accept_encoding: None,
            remote_addr: None,
        }
    }

    /// Extract the context from a hyper request
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let uri = req.uri();
        let target = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), ToString::to_string);
        let mut ctx = Self::new(req.method().clone(), &target);
        ctx.range = header_string(req.headers(), RANGE);
        ctx.accept_encoding = header_string(req.headers(), ACCEPT_ENCODING);
        ctx
    }

    #[must_use]
    pub fn with_range(mut self, value: impl Into<String>) -> Self {
        self.range = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_accept_encoding(mut self, value: impl Into<String>) -> Self {
        self.accept_encoding = Some(value.into());
        self
    }

    #[must_use]
    pub const fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    #[inline]
    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// Whether the client declared it accepts gzip bodies
    pub fn accepts_gzip(&self) -> bool {
        self.accept_encoding
            .as_deref()
            .is_some_and(|value| value.contains("gzip"))
    }
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
