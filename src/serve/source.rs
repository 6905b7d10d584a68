//! Byte sources
//!
//! A source is tagged when it is built: `Seekable` sources can serve byte
//! ranges, `Sequential` ones are only ever copied from start to end.

use hyper::body::Bytes;
use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use crate::http::ByteRange;

/// Readable stream that also supports random access
pub trait SeekRead: Read + Seek + Send {}

impl<T: Read + Seek + Send> SeekRead for T {}

/// Body of a response
pub enum ByteSource<'a> {
    Sequential(Box<dyn Read + Send + 'a>),
    Seekable(Box<dyn SeekRead + 'a>),
}

impl<'a> ByteSource<'a> {
    pub fn sequential(reader: impl Read + Send + 'a) -> Self {
        Self::Sequential(Box::new(reader))
    }

    pub fn seekable(reader: impl Read + Seek + Send + 'a) -> Self {
        Self::Seekable(Box::new(reader))
    }

    #[inline]
    pub const fn is_seekable(&self) -> bool {
        matches!(self, Self::Seekable(_))
    }

    /// Read exactly the bytes of `range`
    ///
    /// Fails with `Unsupported` on sequential sources and `UnexpectedEof`
    /// when the source is shorter than the range.
    pub fn read_range(&mut self, range: ByteRange) -> io::Result<Vec<u8>> {
        let Self::Seekable(reader) = self else {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "source does not support random access",
            ));
        };
        let len = usize::try_from(range.len())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mut buf = vec![0; len];
        reader.seek(SeekFrom::Start(range.begin))?;
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl ByteSource<'static> {
    /// Seekable source over an in-memory buffer
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::seekable(Cursor::new(data.into()))
    }
}

impl Read for ByteSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Sequential(reader) => reader.read(buf),
            Self::Seekable(reader) => reader.read(buf),
        }
    }
}

impl fmt::Debug for ByteSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_seekable() {
            "ByteSource::Seekable(..)"
        } else {
            "ByteSource::Sequential(..)"
        })
    }
}
