//! Mtime-based freshness detection.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Newest mtime among `paths`. Missing files are skipped.
pub fn latest_mtime<'a, I>(paths: I) -> Option<SystemTime>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    paths.into_iter().filter_map(|p| get_mtime(p)).max()
}

/// Check whether any tracked file changed after `last_success`.
///
/// Returns `true` iff some existing file has an mtime strictly greater than
/// the watermark. Without a watermark (never compiled), any existing file
/// counts as changed. An empty or all-missing set is never stale.
pub fn needs_recompile(paths: &[PathBuf], last_success: Option<SystemTime>) -> bool {
    let Some(latest) = latest_mtime(paths) else {
        return false;
    };
    match last_success {
        Some(watermark) => latest > watermark,
        None => true,
    }
}
