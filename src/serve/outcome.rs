use crate::error::ServeError;

/// Result of writing one response
///
/// `written` counts body bytes taken from the source. An error with nothing
/// written means the body was never started and the caller may still send an
/// error response; an error after bytes went out must only be reported.
#[derive(Debug, Default)]
pub struct Outcome {
    pub written: u64,
    pub error: Option<ServeError>,
}

impl Outcome {
    pub const fn ok(written: u64) -> Self {
        Self {
            written,
            error: None,
        }
    }

    pub const fn failed(error: ServeError) -> Self {
        Self {
            written: 0,
            error: Some(error),
        }
    }

    /// Failure after `written` bytes were already sent
    pub const fn partial(written: u64, error: ServeError) -> Self {
        Self {
            written,
            error: Some(error),
        }
    }

    /// Whether an error body should replace this response
    #[inline]
    pub const fn needs_error_body(&self) -> bool {
        self.written == 0 && self.error.is_some()
    }
}
