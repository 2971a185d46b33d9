use std::path::PathBuf;

use thiserror::Error;

use crate::core::{Classify, ErrorClass};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("`{name}` is not an editable file (allowed: {allowed})")]
    InvalidExtension { name: String, allowed: String },

    #[error("invalid file name `{0}`")]
    InvalidName(String),

    #[error("no content provided for `{0}`")]
    EmptyContent(String),

    #[error("file `{0}` not found")]
    NotFound(String),

    #[error("no backup of `{0}`")]
    BackupNotFound(String),

    #[error("I/O error on `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(super) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Classify for StoreError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidExtension { .. } | Self::InvalidName(_) | Self::EmptyContent(_) => {
                ErrorClass::BadRequest
            }
            Self::NotFound(_) | Self::BackupNotFound(_) => ErrorClass::NotFound,
            Self::Io { .. } => ErrorClass::Internal,
        }
    }
}
