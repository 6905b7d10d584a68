//! Request handler module
//!
//! Resolution of request paths to resources, and the observe-and-report
//! wrapper every request runs through.

pub mod app;
pub mod request;

// Re-export main entry points
pub use app::{resource_name, App};
pub use request::Handler;
