//! Extension-based MIME lookup
//!
//! Static table only; file contents are never inspected.

use std::path::Path;

/// MIME type reported for unmapped or missing extensions
pub const DEFAULT_MIMETYPE: &str = "application/octet-stream";

/// Guess a MIME type from the extension of `path`
///
/// Matching is case-insensitive.
///
/// # Examples
///
/// ```rust
/// use asyncfs::mime::detect_by_filename;
///
/// assert_eq!(detect_by_filename("notes/Readme.TXT"), "text/plain");
/// assert_eq!(detect_by_filename("archive.unknown"), "application/octet-stream");
/// ```
#[must_use]
pub fn detect_by_filename(path: &str) -> &'static str {
    let Some(extension) = Path::new(path).extension().and_then(|e| e.to_str()) else {
        return DEFAULT_MIMETYPE;
    };

    match extension.to_ascii_lowercase().as_str() {
        "txt" | "log" | "conf" | "ini" => "text/plain",
        "csv" => "text/csv",
        "htm" | "html" => "text/html",
        "css" => "text/css",
        "md" | "markdown" => "text/markdown",
        "xml" => "application/xml",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "yaml" | "yml" => "application/x-yaml",
        "toml" => "application/toml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",
        "bz2" => "application/x-bzip2",
        "7z" => "application/x-7z-compressed",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "rtf" => "application/rtf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "wasm" => "application/wasm",
        _ => DEFAULT_MIMETYPE,
    }
}
