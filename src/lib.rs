//! Response-serving primitives for hyper servers
//!
//! Writes a byte source (file, buffer, JSON value) as an HTTP response with
//! content-type, caching and disposition headers, single byte-range support
//! and optional gzip, then reports the outcome to a log sink.

pub mod config;
pub mod error;
pub mod fs;
pub mod handler;
pub mod http;
pub mod logger;
pub mod serve;
pub mod server;

pub use error::{ErrorCategory, ServeError};
