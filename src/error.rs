//! Error types and status code classification
//!
//! Every failure produced while resolving or writing a response ends up as a
//! [`ServeError`]. The request handler is the only place that turns one into a
//! status code, using the fixed category precedence defined here.

use hyper::StatusCode;
use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Errors raised while serving a response
#[derive(Debug, Error)]
pub enum ServeError {
    /// Filesystem or transport failure, passed through unchanged
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The resolver only answers GET requests
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Value could not be encoded as JSON
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Range start lies at or past the end of the resource
    #[error("range start {begin} is beyond resource size {size}")]
    RangeOutOfBounds { begin: u64, size: u64 },
}

impl ServeError {
    /// Shorthand for a "does not exist" error carrying `name`
    pub fn not_found(name: &str) -> Self {
        Self::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("open {name}: file does not exist"),
        ))
    }

    /// Category of this error, searching the whole source chain
    pub fn category(&self) -> ErrorCategory {
        classify(self)
    }

    /// Status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }
}

/// Well-known error conditions, in precedence order
///
/// When an error chain matches several categories the one declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    NotFound,
    PermissionDenied,
    InvalidInput,
    MethodNotAllowed,
    Unknown,
}

impl ErrorCategory {
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Map an optional error to the response status
///
/// `None` is success (200); everything else goes through [`classify`].
pub fn status_code(err: Option<&ServeError>) -> StatusCode {
    err.map_or(StatusCode::OK, ServeError::status_code)
}

/// Classify any error by walking its source chain
///
/// `io::Error` payloads are inspected as well, so an `io::Error::other`
/// wrapping a [`ServeError`] keeps its category.
pub fn classify(err: &(dyn StdError + 'static)) -> ErrorCategory {
    let mut best = ErrorCategory::Unknown;
    let mut current = Some(err);
    while let Some(e) = current {
        best = best.min(direct_category(e));
        current = next_in_chain(e);
    }
    best
}

fn direct_category(err: &(dyn StdError + 'static)) -> ErrorCategory {
    if let Some(serve) = err.downcast_ref::<ServeError>() {
        return match serve {
            ServeError::Io(io_err) => kind_category(io_err.kind()),
            ServeError::MethodNotAllowed => ErrorCategory::MethodNotAllowed,
            ServeError::Json(_) | ServeError::RangeOutOfBounds { .. } => ErrorCategory::Unknown,
        };
    }
    if let Some(io_err) = err.downcast_ref::<io::Error>() {
        return kind_category(io_err.kind());
    }
    ErrorCategory::Unknown
}

const fn kind_category(kind: io::ErrorKind) -> ErrorCategory {
    match kind {
        io::ErrorKind::NotFound => ErrorCategory::NotFound,
        io::ErrorKind::PermissionDenied => ErrorCategory::PermissionDenied,
        io::ErrorKind::InvalidInput => ErrorCategory::InvalidInput,
        _ => ErrorCategory::Unknown,
    }
}

// `io::Error::source` skips its own payload, so step into it explicitly.
fn next_in_chain<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a (dyn StdError + 'static)> {
    let io_err = match err.downcast_ref::<ServeError>() {
        Some(ServeError::Io(io_err)) => Some(io_err),
        Some(_) => None,
        None => err.downcast_ref::<io::Error>(),
    };
    match io_err {
        Some(io_err) => io_err
            .get_ref()
            .map(|inner| inner as &(dyn StdError + 'static)),
        None => err.source(),
    }
}
