//! Response engine
//!
//! Writes one response from a byte source into a [`ResponseSink`]: entity and
//! caching headers, single byte-range requests on seekable sources, and gzip
//! for compressible bodies.

use flate2::write::GzEncoder;
use flate2::Compression;
use hyper::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED, VARY,
};
use hyper::StatusCode;
use serde::Serialize;
use std::io::{self, Read, Write};

use crate::error::ServeError;
use crate::fs::{FileSystem, OpenFile};
use crate::http::{cache, mime, parse_range_header, ByteRange, RequestContext, ResponseSink};

use super::options::{ResponseOptions, Resolved};
use super::outcome::Outcome;
use super::source::ByteSource;

/// Bodies at or below this size are never compressed
pub const COMPRESSION_THRESHOLD: u64 = 1400;

const COPY_BUFFER_SIZE: usize = 32 * 1024;

/// Write `source` as the response to `req`
///
/// Headers are emitted in a fixed order: Content-Type, Cache-Control,
/// Last-Modified, then either the partial-content headers of a range request
/// or Content-Disposition, Vary/Content-Encoding and Content-Length. HEAD
/// requests never receive body bytes.
pub fn serve_source(
    sink: &mut ResponseSink,
    req: &RequestContext,
    mut source: ByteSource<'_>,
    options: ResponseOptions,
) -> Outcome {
    write_response(sink, req, &mut source, options.resolve()).unwrap_or_else(Outcome::failed)
}

fn write_response(
    sink: &mut ResponseSink,
    req: &RequestContext,
    source: &mut ByteSource<'_>,
    mut opts: Resolved,
) -> Result<Outcome, ServeError> {
    if let Some(mime) = &opts.mime {
        sink.set_header(CONTENT_TYPE, mime)?;
    }
    if let Some(value) = cache::cache_control(opts.max_age, opts.immutable) {
        sink.set_header(CACHE_CONTROL, &value)?;
    }
    if let Some(modified_at) = &opts.modified_at {
        sink.set_header(LAST_MODIFIED, &cache::http_date(modified_at))?;
    }

    if source.is_seekable() {
        sink.set_header(ACCEPT_RANGES, "bytes")?;
        if let Some((range, size)) = requested_range(req, opts.size) {
            return write_range(sink, req, source, range, size);
        }
    }

    if let Some(disposition) = &opts.disposition {
        sink.set_header(CONTENT_DISPOSITION, disposition)?;
    }

    let mut gzip = false;
    if opts.compress {
        sink.set_header(VARY, "Content-Encoding")?;
        if opts.size.is_some_and(|size| size > COMPRESSION_THRESHOLD) && req.accepts_gzip() {
            opts.size = None;
            sink.set_header(CONTENT_ENCODING, "gzip")?;
            gzip = true;
        }
    }
    if let Some(size) = opts.size.filter(|&size| size > 0) {
        sink.set_header(CONTENT_LENGTH, &size.to_string())?;
    }

    if req.is_head() {
        return Ok(Outcome::ok(0));
    }

    let outcome = if gzip {
        copy_gzip(source, sink)
    } else {
        let (written, err) = copy_counted(source, sink);
        finish(written, err)
    };
    Ok(outcome)
}

/// Range to serve, if the request carries a usable one
///
/// Ranges need a known, non-empty declared size.
fn requested_range(req: &RequestContext, size: Option<u64>) -> Option<(ByteRange, u64)> {
    let size = size.filter(|&size| size > 0)?;
    let range = parse_range_header(req.range.as_deref()?, size)?;
    Some((range, size))
}

fn write_range(
    sink: &mut ResponseSink,
    req: &RequestContext,
    source: &mut ByteSource<'_>,
    range: ByteRange,
    size: u64,
) -> Result<Outcome, ServeError> {
    if range.begin >= size {
        return Err(ServeError::RangeOutOfBounds {
            begin: range.begin,
            size,
        });
    }
    let buf = source.read_range(range)?;

    sink.set_header(CONTENT_RANGE, &range.content_range(size))?;
    sink.set_header(CONTENT_LENGTH, &buf.len().to_string())?;
    sink.write_head(StatusCode::PARTIAL_CONTENT);

    if req.is_head() {
        return Ok(Outcome::ok(0));
    }
    sink.write_all(&buf)?;
    Ok(Outcome::ok(buf.len() as u64))
}

// Only a complete copy gets the gzip trailer. A failed copy flushes what was
// compressed and leaves the stream unterminated, so clients see a truncated
// body instead of a valid short one. Nothing reaches the sink when the source
// failed before its first byte.
fn copy_gzip(source: &mut ByteSource<'_>, sink: &mut ResponseSink) -> Outcome {
    let mut encoder = GzEncoder::new(Gate::new(sink), Compression::default());
    let (written, copy_err) = copy_counted(source, &mut encoder);
    match copy_err {
        None => finish(written, encoder.finish().err()),
        Some(err) => {
            if written > 0 {
                // the copy error is the one worth reporting
                let _ = encoder.flush();
            }
            encoder.get_mut().close();
            finish(written, Some(err))
        }
    }
}

/// Writer into the sink that can be closed for good
///
/// Dropping a `GzEncoder` tries to finish the stream; a closed gate swallows
/// those bytes.
struct Gate<'a> {
    sink: &'a mut ResponseSink,
    open: bool,
}

impl<'a> Gate<'a> {
    fn new(sink: &'a mut ResponseSink) -> Self {
        Self { sink, open: true }
    }

    fn close(&mut self) {
        self.open = false;
    }
}

impl Write for Gate<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.open {
            self.sink.write(buf)
        } else {
            Ok(buf.len())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

fn finish(written: u64, err: Option<io::Error>) -> Outcome {
    match err {
        None => Outcome::ok(written),
        Some(err) => Outcome::partial(written, err.into()),
    }
}

/// Copy until EOF, reporting how much was written even when the copy fails
fn copy_counted<R, W>(reader: &mut R, writer: &mut W) -> (u64, Option<io::Error>)
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0; COPY_BUFFER_SIZE];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return (written, None),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (written, Some(e)),
        };
        if let Err(e) = writer.write_all(&buf[..n]) {
            return (written, Some(e));
        }
        written += n as u64;
    }
}

/// Serve an in-memory buffer; its length always defines the size
pub fn serve_bytes(
    sink: &mut ResponseSink,
    req: &RequestContext,
    data: impl Into<hyper::body::Bytes>,
    options: ResponseOptions,
) -> Outcome {
    let data = data.into();
    let options = options.merge(ResponseOptions::new().size_of(&data));
    serve_source(sink, req, ByteSource::from_bytes(data), options)
}

/// Serve `value` encoded as JSON
///
/// Size and Content-Type come from the encoding; `options` may override them.
pub fn serve_json<T: Serialize + ?Sized>(
    sink: &mut ResponseSink,
    req: &RequestContext,
    value: &T,
    options: ResponseOptions,
) -> Outcome {
    let data = match serde_json::to_vec(value) {
        Ok(data) => data,
        Err(e) => return Outcome::failed(e.into()),
    };
    let base = ResponseOptions::new()
        .size_of(&data)
        .mime(mime::JSON_MIME);
    serve_source(sink, req, ByteSource::from_bytes(data), base.merge(options))
}

/// Open `name` on `fs` and serve it
pub fn serve_file(
    sink: &mut ResponseSink,
    req: &RequestContext,
    fs: &dyn FileSystem,
    name: &str,
    options: ResponseOptions,
) -> Outcome {
    match fs.open(name) {
        Ok(file) => serve_open_file(sink, req, name, file, options),
        Err(e) => Outcome::failed(e.into()),
    }
}

/// Serve an already opened file
///
/// Size, Content-Type (from the extension of `name`) and modification time
/// come from the file; `options` may override them. The file is closed when
/// this returns.
pub fn serve_open_file(
    sink: &mut ResponseSink,
    req: &RequestContext,
    name: &str,
    file: OpenFile,
    options: ResponseOptions,
) -> Outcome {
    if file.info.is_dir {
        return Outcome::failed(
            io::Error::other(format!("read {name}: is a directory")).into(),
        );
    }
    let mut base = ResponseOptions::new().size(file.info.size);
    if let Some(mime) = mime::type_by_name(name) {
        base = base.mime(mime);
    }
    if let Some(modified) = file.info.modified {
        base = base.modified_at(modified.into());
    }
    serve_source(sink, req, file.source, base.merge(options))
}
