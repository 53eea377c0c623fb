//! Content-Type lookup for served files.

use std::ffi::OsStr;
use std::path::Path;

/// Type used for plain-text error bodies.
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Content-Type header value for a file, chosen by extension.
///
/// Covers what a local data directory actually holds; anything else is
/// served as opaque bytes.
pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(OsStr::to_str) {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => TEXT_PLAIN,

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        // Documents / binary
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",

        _ => "application/octet-stream",
    }
}
