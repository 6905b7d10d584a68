//! Response options
//!
//! Options are plain data: each field is `None` until set, and two option
//! sets combine with [`ResponseOptions::merge`], the right-hand side winning.
//! The engine takes them by value, so they are final before any header goes
//! out.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::http::cache::ONE_YEAR;

/// Declared properties of a response body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseOptions {
    /// Total length of the body in bytes
    pub size: Option<u64>,
    pub mime: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
    pub max_age: Option<Duration>,
    /// Marks the body as never changing; lifts max-age to a year
    pub immutable: Option<bool>,
    /// `Some("")` explicitly selects inline disposition
    pub disposition: Option<String>,
    /// Opt-in to gzip when the client accepts it
    pub compress: Option<bool>,
}

impl ResponseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn size_of(self, data: &[u8]) -> Self {
        self.size(data.len() as u64)
    }

    #[must_use]
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    #[must_use]
    pub const fn modified_at(mut self, time: DateTime<Utc>) -> Self {
        self.modified_at = Some(time);
        self
    }

    #[must_use]
    pub const fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    #[must_use]
    pub const fn immutable(mut self, immutable: bool) -> Self {
        self.immutable = Some(immutable);
        self
    }

    #[must_use]
    pub const fn compress(mut self, compress: bool) -> Self {
        self.compress = Some(compress);
        self
    }

    /// Serve as a download named `name`; an empty name means inline
    #[must_use]
    pub fn attachment(mut self, name: &str) -> Self {
        self.disposition = Some(if name.is_empty() {
            String::new()
        } else {
            format!("attachment; filename=\"{}\"", name.replace('"', "\\\""))
        });
        self
    }

    /// Combine two option sets; fields set in `other` take precedence
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            size: other.size.or(self.size),
            mime: other.mime.or(self.mime),
            modified_at: other.modified_at.or(self.modified_at),
            max_age: other.max_age.or(self.max_age),
            immutable: other.immutable.or(self.immutable),
            disposition: other.disposition.or(self.disposition),
            compress: other.compress.or(self.compress),
        }
    }

    pub(crate) fn resolve(self) -> Resolved {
        let immutable = self.immutable.unwrap_or(false);
        let mut max_age = self.max_age.unwrap_or_default();
        if immutable && max_age < ONE_YEAR {
            max_age = ONE_YEAR;
        }
        Resolved {
            size: self.size,
            mime: self.mime.filter(|m| !m.is_empty()),
            modified_at: self.modified_at,
            max_age,
            immutable,
            disposition: self.disposition.filter(|d| !d.is_empty()),
            compress: self.compress.unwrap_or(false),
        }
    }
}

/// Options with defaults applied, as consumed by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub size: Option<u64>,
    pub mime: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
    pub max_age: Duration,
    pub immutable: bool,
    pub disposition: Option<String>,
    pub compress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_right_wins() {
        let base = ResponseOptions::new().size(10).mime("text/plain").compress(true);
        let merged = base.merge(ResponseOptions::new().mime("text/html"));
        assert_eq!(merged.size, Some(10));
        assert_eq!(merged.mime.as_deref(), Some("text/html"));
        assert_eq!(merged.compress, Some(true));
    }

    #[test]
    fn test_empty_attachment_overrides_to_inline() {
        let opts = ResponseOptions::new()
            .attachment("report.pdf")
            .merge(ResponseOptions::new().attachment(""));
        assert_eq!(opts.resolve().disposition, None);

        let opts = ResponseOptions::new().attachment("report.pdf");
        assert_eq!(
            opts.resolve().disposition.as_deref(),
            Some("attachment; filename=\"report.pdf\"")
        );
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = ResponseOptions::new().mime("").resolve();
        assert_eq!(resolved.size, None);
        assert_eq!(resolved.mime, None);
        assert_eq!(resolved.max_age, Duration::ZERO);
        assert!(!resolved.immutable);
        assert!(!resolved.compress);
    }

    #[test]
    fn test_immutable_lifts_max_age() {
        let resolved = ResponseOptions::new()
            .max_age(Duration::from_secs(60))
            .immutable(true)
            .resolve();
        assert_eq!(resolved.max_age, ONE_YEAR);
    }
}
