//! MIME type detection module
//!
//! Maps a resource name's extension to a Content-Type. Unknown extensions
//! yield `None` so no Content-Type header is emitted for them.

use std::path::Path;

/// Content-Type used for JSON bodies
pub const JSON_MIME: &str = "application/json; charset=utf-8";

/// Get MIME Content-Type from a resource name
///
/// # Examples
/// ```
/// use rangeserve::http::mime::type_by_name;
/// assert_eq!(type_by_name("index.html"), Some("text/html; charset=utf-8"));
/// assert_eq!(type_by_name("clip.MP4"), Some("video/mp4"));
/// assert_eq!(type_by_name("README"), None);
/// ```
pub fn type_by_name(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?;
    type_by_extension(&extension.to_ascii_lowercase())
}

/// Get MIME Content-Type from a lowercase extension without the leading dot
pub fn type_by_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",

        // JavaScript/WASM
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",

        // Audio
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents and archives
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",

        _ => return None,
    };
    Some(mime)
}
