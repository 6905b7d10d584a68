//! Resource resolution module
//!
//! Maps a request path onto the filesystem, falling back to the configured
//! index resource for directories and missing paths.

use hyper::Method;
use std::borrow::Cow;
use std::io;
use std::sync::Arc;

use crate::error::ServeError;
use crate::fs::FileSystem;
use crate::http::{RequestContext, ResponseSink};
use crate::serve::{serve_file, serve_open_file, Outcome, ResponseOptions};

/// Serves GET requests from a filesystem
#[derive(Clone)]
pub struct App {
    fs: Arc<dyn FileSystem>,
    index_file: Option<String>,
    options: ResponseOptions,
}

impl App {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            index_file: None,
            options: ResponseOptions::new(),
        }
    }

    /// Resource served for directories and missing paths; empty disables it
    #[must_use]
    pub fn with_index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = Some(name.into()).filter(|name| !name.is_empty());
        self
    }

    /// Options applied on top of what each file declares
    #[must_use]
    pub fn with_options(mut self, options: ResponseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolve(&self, sink: &mut ResponseSink, req: &RequestContext) -> Outcome {
        if req.method != Method::GET {
            return Outcome::failed(ServeError::MethodNotAllowed);
        }
        let name = match resource_name(&req.path) {
            Ok(name) => name,
            Err(e) => return Outcome::failed(e.into()),
        };

        match self.fs.open(&name) {
            Ok(file) if !file.info.is_dir => {
                return serve_open_file(sink, req, &name, file, self.options.clone());
            }
            // Directory handle is released before the index is opened
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Outcome::failed(e.into()),
        }

        match &self.index_file {
            Some(index) => serve_file(sink, req, self.fs.as_ref(), index, self.options.clone()),
            None => Outcome::failed(ServeError::not_found(&name)),
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("index_file", &self.index_file)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Filesystem name for a request path
///
/// Percent-escapes are decoded and surrounding slashes trimmed; the empty
/// path names the root (`.`).
pub fn resource_name(path: &str) -> io::Result<Cow<'_, str>> {
    let decoded = urlencoding::decode(path)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let name = match decoded {
        Cow::Borrowed(path) => Cow::Borrowed(path.trim_matches('/')),
        Cow::Owned(path) => Cow::Owned(path.trim_matches('/').to_string()),
    };
    if name.is_empty() {
        return Ok(Cow::Borrowed("."));
    }
    Ok(name)
}
