use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use super::StoreError;
use crate::config::WorkspaceConfig;

/// Backups are kept under this name inside the state directory.
const BACKUP_DIR: &str = "backup";

/// One tracked source file as read from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
    #[serde(serialize_with = "crate::utils::time::serialize_millis")]
    pub modified: SystemTime,
}

/// File storage for one workspace directory.
#[derive(Debug, Clone)]
pub struct SourceStore {
    root: PathBuf,
    backup_dir: PathBuf,
    extensions: Vec<String>,
}

impl SourceStore {
    pub fn new(root: impl Into<PathBuf>, state_dir: &Path, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            backup_dir: state_dir.join(BACKUP_DIR),
            extensions,
        }
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self::new(
            config.root.clone(),
            &config.state_path(),
            config.extensions.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted names of all tracked files. A missing root is an empty workspace.
    pub fn list_tracked(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| self.check_name(name).is_ok())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Absolute paths of all tracked files.
    pub fn tracked_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        Ok(self
            .list_tracked()?
            .into_iter()
            .map(|name| self.root.join(name))
            .collect())
    }

    /// Whether `path` is a tracked file of this workspace (watcher filter).
    pub fn is_tracked_path(&self, path: &Path) -> bool {
        path.parent() == Some(self.root.as_path())
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| self.check_name(name).is_ok())
    }

    pub fn read(&self, name: &str) -> Result<SourceFile, StoreError> {
        self.check_name(name)?;
        let path = self.root.join(name);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| StoreError::io(&path, e))?;

        Ok(SourceFile {
            name: name.to_string(),
            content,
            modified,
        })
    }

    /// Read every tracked file. Files that vanish or fail to decode between
    /// listing and reading are skipped.
    pub fn read_all(&self) -> Result<Vec<SourceFile>, StoreError> {
        let mut files = Vec::new();
        for name in self.list_tracked()? {
            match self.read(&name) {
                Ok(file) => files.push(file),
                Err(e) => crate::debug!("store"; "skipping {}: {}", name, e),
            }
        }
        Ok(files)
    }

    /// Write `content` to `name`, keeping the previous content as a backup.
    ///
    /// Validation happens before anything touches the disk. The new content
    /// is written to a hidden temp file and renamed into place, so the
    /// compiler never reads a half-written source.
    pub fn write(&self, name: &str, content: &str) -> Result<SourceFile, StoreError> {
        self.check_name(name)?;
        if content.is_empty() {
            return Err(StoreError::EmptyContent(name.to_string()));
        }

        let path = self.root.join(name);
        self.backup(name, &path)?;

        let tmp = self.root.join(format!(".{name}.tmp"));
        fs::write(&tmp, content).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::io(&path, e)
        })?;

        crate::debug!("store"; "saved {} ({} bytes)", name, content.len());
        self.read(name)
    }

    /// Content `name` had before its most recent overwrite.
    pub fn read_backup(&self, name: &str) -> Result<String, StoreError> {
        self.check_name(name)?;
        let path = self.backup_path(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::BackupNotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn backup_path(&self, name: &str) -> PathBuf {
        self.backup_dir.join(format!("{name}.bak"))
    }

    fn backup(&self, name: &str, path: &Path) -> Result<(), StoreError> {
        if !path.is_file() {
            return Ok(());
        }
        fs::create_dir_all(&self.backup_dir).map_err(|e| StoreError::io(&self.backup_dir, e))?;
        let backup = self.backup_path(name);
        fs::copy(path, &backup).map_err(|e| StoreError::io(&backup, e))?;
        Ok(())
    }

    /// A plain file name (no separators, no leading dot) with an allowed extension.
    fn check_name(&self, name: &str) -> Result<(), StoreError> {
        let is_plain = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
            && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
        if !is_plain {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        let ext = Path::new(name).extension().and_then(|e| e.to_str());
        match ext {
            Some(ext) if self.extensions.iter().any(|allowed| allowed == ext) => Ok(()),
            _ => Err(StoreError::InvalidExtension {
                name: name.to_string(),
                allowed: self
                    .extensions
                    .iter()
                    .map(|e| format!(".{e}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}
