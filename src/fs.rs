//! Filesystem capability
//!
//! The resolver only needs to open names and learn their size and kind.
//! [`DirFs`] provides that over a directory on disk.

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::serve::ByteSource;

/// Stat of an opened resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
    pub is_dir: bool,
    pub modified: Option<SystemTime>,
}

/// Opened resource; dropping it closes the underlying handle
#[derive(Debug)]
pub struct OpenFile {
    pub info: FileInfo,
    pub source: ByteSource<'static>,
}

/// Source of named resources
pub trait FileSystem: Send + Sync {
    /// Open `name`, a slash-separated path relative to the filesystem root
    ///
    /// Missing resources fail with `NotFound`, malformed names with
    /// `InvalidInput`.
    fn open(&self, name: &str) -> io::Result<OpenFile>;
}

/// Check a name the way a rooted filesystem does
///
/// `.` names the root. Otherwise the name is a sequence of non-empty segments
/// separated by `/`, none of which is `.` or `..`, with no leading or trailing
/// slash and no backslash.
pub fn valid_name(name: &str) -> bool {
    if name == "." {
        return true;
    }
    !name.is_empty()
        && !name.contains('\\')
        && !name.contains('\0')
        && name
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Filesystem rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        if !valid_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("open {name}: invalid argument"),
            ));
        }
        let path = if name == "." {
            self.root.clone()
        } else {
            self.root.join(name)
        };

        // Symlinks may still point outside the root
        let root = self.root.canonicalize().map_err(|e| with_name(name, &e))?;
        let canonical = path.canonicalize().map_err(|e| with_name(name, &e))?;
        if !canonical.starts_with(&root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("open {name}: outside of served directory"),
            ));
        }
        Ok(canonical)
    }
}

impl FileSystem for DirFs {
    fn open(&self, name: &str) -> io::Result<OpenFile> {
        let path = self.resolve(name)?;
        let metadata = fs::metadata(&path).map_err(|e| with_name(name, &e))?;
        let info = FileInfo {
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            modified: metadata.modified().ok(),
        };
        if info.is_dir {
            return Ok(OpenFile {
                info,
                source: ByteSource::sequential(io::empty()),
            });
        }
        let file = File::open(&path).map_err(|e| with_name(name, &e))?;
        Ok(OpenFile {
            info,
            source: ByteSource::seekable(file),
        })
    }
}

// Keep the kind so classification still works, add the name for the log line.
fn with_name(name: &str, err: &io::Error) -> io::Error {
    io::Error::new(err.kind(), format!("open {name}: {err}"))
}
