//! HTTP protocol layer module
//!
//! Header helpers, range parsing and the buffered response target shared by
//! the response engine and the server.

pub mod cache;
pub mod mime;
pub mod range;
pub mod request;
pub mod sink;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RANGE_BUFFER_SIZE};
pub use request::RequestContext;
pub use sink::ResponseSink;
