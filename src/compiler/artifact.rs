//! The current compiled artifact.
//!
//! The orchestrator publishes into the store only after a successful
//! compile, so a failed build leaves the last good artifact in place.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use crate::core::{Classify, ErrorClass};

#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Nothing compiled successfully yet. Expected, not a fault.
    #[error("artifact not available")]
    NotFound,

    #[error("I/O error on `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Classify for ArtifactError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound => ErrorClass::NotFound,
            Self::Io { .. } => ErrorClass::Internal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub modified: SystemTime,
}

/// Location of the published artifact.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name offered for downloads (`main.pdf`).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string())
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn get(&self) -> Result<Artifact, ArtifactError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ArtifactError::NotFound),
            Err(e) => return Err(self.io(e)),
        };
        let modified = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| self.io(e))?;
        Ok(Artifact { bytes, modified })
    }

    /// Replace the artifact with the file at `built`.
    ///
    /// Copies next to the target first and renames into place, so readers
    /// see either the old or the new artifact, never a partial one.
    pub fn publish(&self, built: &Path) -> Result<(), ArtifactError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::copy(built, &tmp).map_err(|source| ArtifactError::Io {
            path: built.to_path_buf(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            self.io(e)
        })
    }

    fn io(&self, source: std::io::Error) -> ArtifactError {
        ArtifactError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
