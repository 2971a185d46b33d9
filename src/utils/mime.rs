//! MIME type detection for the preview server.

use std::path::Path;

/// MIME type constants.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const PDF: &str = "application/pdf";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const WOFF2: &str = "font/woff2";
}

/// Guess MIME type from file extension.
pub fn from_path(path: &Path) -> &'static str {
    from_extension(path.extension().and_then(|e| e.to_str()))
}

/// Guess MIME type from file extension string.
///
/// Covers what a browser frontend and its PDF renderer load; LaTeX sources
/// are served as plain text.
pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs") => types::JAVASCRIPT,
        Some("json" | "map") => types::JSON,
        Some("pdf") => types::PDF,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("svg") => types::SVG,
        Some("ico") => types::ICO,
        Some("woff2") => types::WOFF2,
        Some("txt" | "tex" | "sty" | "cls" | "bib" | "log") => types::PLAIN,
        _ => types::OCTET_STREAM,
    }
}
