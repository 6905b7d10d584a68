//! Response serving module
//!
//! The engine proper ([`serve_source`]) and its convenience entry points for
//! buffers, JSON values and files.

mod engine;
mod options;
mod outcome;
mod source;

pub use engine::{
    serve_bytes, serve_file, serve_json, serve_open_file, serve_source, COMPRESSION_THRESHOLD,
};
pub use options::ResponseOptions;
pub use outcome::Outcome;
pub use source::{ByteSource, SeekRead};
