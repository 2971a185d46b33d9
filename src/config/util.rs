//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/resume/sections/    ← cwd
/// /home/user/resume/texpane.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

fn find_upward(start: &Path, config_name: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_upward_from_nested_dir() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("sections/extra");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("texpane.toml"), "").unwrap();

        let found = find_upward(&nested, Path::new("texpane.toml")).unwrap();
        assert_eq!(found, temp.path().join("texpane.toml"));
    }

    #[test]
    fn test_find_upward_ignores_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("texpane-dir.toml")).unwrap();
        assert!(find_upward(temp.path(), Path::new("texpane-dir.toml")).is_none());
    }

    #[test]
    fn test_absolute_missing_path() {
        let temp = TempDir::new().unwrap();
        assert!(find_config_file(&temp.path().join("nope.toml")).is_none());
    }
}
