//! HTTP Range request parsing module
//!
//! Single `bytes=<first>-<last>` ranges only. The result is a half-open
//! interval clamped to the resource size and to [`RANGE_BUFFER_SIZE`].

/// Largest slice served for one range request (4 MiB)
pub const RANGE_BUFFER_SIZE: u64 = 1 << 22;

/// Half-open byte interval `[begin, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub begin: u64,
    pub end: u64,
}

impl ByteRange {
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.begin
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end == self.begin
    }

    /// `Content-Range` header value for a resource of `size` bytes
    pub fn content_range(&self, size: u64) -> String {
        format!(
            "bytes {}-{}/{size}",
            self.begin,
            self.end.saturating_sub(1)
        )
    }
}

/// Parse a `Range` header value against a resource of `size` bytes
///
/// `<last>` is inclusive as sent on the wire, so `bytes=0-99` yields `0..100`.
/// When `<last>` is missing, not past `<first>`, or the span is larger than
/// [`RANGE_BUFFER_SIZE`], the range falls back to
/// `begin..min(begin + RANGE_BUFFER_SIZE, size)`.
///
/// A start past the end of the resource is not rejected here; the returned
/// range is empty and reading it is the caller's failure to report.
///
/// Returns `None` for anything that is not a single well-formed `bytes`
/// range, including multi-range and suffix (`bytes=-N`) forms.
///
/// # Examples
/// ```
/// use rangeserve::http::range::{parse_range_header, ByteRange};
///
/// let range = parse_range_header("bytes=0-99", 1000);
/// assert_eq!(range, Some(ByteRange { begin: 0, end: 100 }));
///
/// assert_eq!(parse_range_header("items=0-9", 1000), None);
/// ```
pub fn parse_range_header(value: &str, size: u64) -> Option<ByteRange> {
    let set = value.trim().strip_prefix("bytes=")?;

    // Only a single range is supported
    if set.contains(',') {
        return None;
    }

    let (first, last) = set.split_once('-')?;
    let begin = parse_position(first)?;
    let last = if last.trim().is_empty() {
        None
    } else {
        Some(parse_position(last)?)
    };

    let requested = last
        .filter(|&last| last > begin)
        .and_then(|last| last.checked_add(1))
        .filter(|&end| end - begin <= RANGE_BUFFER_SIZE);

    let end = requested
        .unwrap_or_else(|| begin.saturating_add(RANGE_BUFFER_SIZE))
        .min(size)
        .max(begin);

    Some(ByteRange { begin, end })
}

fn parse_position(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
