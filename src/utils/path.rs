//! Path and URL-path helpers.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `decode_segment` - percent-decoded URL path segment
//! - `safe_join` - join a request path below a root without escaping it

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Percent-decode one URL path segment. Invalid UTF-8 yields `None`.
pub fn decode_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// Join a URL path (e.g. `/js/app.js`) below `root`.
///
/// Returns `None` if any component would leave `root` (`..`, absolute
/// prefixes) or fails to decode.
pub fn safe_join(root: &Path, url_path: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for segment in url_path.split('/').filter(|s| !s.is_empty()) {
        let decoded = decode_segment(segment)?;
        let mut components = Path::new(&decoded).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => out.push(part),
            _ => return None,
        }
    }
    Some(out)
}
