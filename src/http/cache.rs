//! HTTP caching header module
//!
//! Builds `Cache-Control` and `Last-Modified` values.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

/// Minimum max-age applied to immutable responses
pub const ONE_YEAR: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Cache-Control header value, or `None` when caching headers are not wanted
///
/// `immutable` lifts `max_age` to at least [`ONE_YEAR`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use rangeserve::http::cache::cache_control;
///
/// assert_eq!(cache_control(Duration::from_secs(60), false).as_deref(), Some("public, max-age=60"));
/// assert_eq!(cache_control(Duration::ZERO, false), None);
/// ```
pub fn cache_control(max_age: Duration, immutable: bool) -> Option<String> {
    if max_age.is_zero() && !immutable {
        return None;
    }
    let max_age = if immutable {
        max_age.max(ONE_YEAR)
    } else {
        max_age
    };
    let mut value = format!("public, max-age={}", max_age.as_secs());
    if immutable {
        value.push_str(", immutable");
    }
    Some(value)
}

/// Format a timestamp as an HTTP date (IMF-fixdate)
pub fn http_date<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    time.with_timezone(&Utc)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_control() {
        assert_eq!(
            cache_control(Duration::from_secs(3600), false).as_deref(),
            Some("public, max-age=3600")
        );
        assert_eq!(cache_control(Duration::ZERO, false), None);
    }

    #[test]
    fn test_immutable_lifts_max_age() {
        assert_eq!(
            cache_control(Duration::from_secs(10), true).as_deref(),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(
            cache_control(Duration::ZERO, true).as_deref(),
            Some("public, max-age=31536000, immutable")
        );
        let two_years = ONE_YEAR * 2;
        assert_eq!(
            cache_control(two_years, true).as_deref(),
            Some("public, max-age=63072000, immutable")
        );
    }

    #[test]
    fn test_http_date() {
        let time = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(http_date(&time), "Wed, 21 Oct 2015 07:28:00 GMT");
    }
}
