use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::ArtifactError;
use crate::core::{Classify, ErrorClass};
use crate::utils::exec::ExecError;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Another compile is in flight. Nothing was started.
    #[error("a compile is already running")]
    Busy,

    #[error("no compiler command configured")]
    NoCommand,

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("compilation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Non-zero exit. Carries the compiler's diagnostic output verbatim.
    #[error("{0}")]
    Failed(String),

    #[error("artifact not produced")]
    ArtifactMissing,

    #[error("I/O error on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ExecError> for CompileError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Spawn { program, source } => Self::Spawn { program, source },
            ExecError::Timeout { after, .. } => Self::Timeout(after),
            ExecError::Wait { program, source } => Self::Io {
                path: PathBuf::from(program),
                source,
            },
        }
    }
}

impl From<ArtifactError> for CompileError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound => Self::ArtifactMissing,
            ArtifactError::Io { path, source } => Self::Io { path, source },
        }
    }
}

impl Classify for CompileError {
    fn class(&self) -> ErrorClass {
        ErrorClass::CompileFailure
    }

    fn status_code(&self) -> u16 {
        match self {
            Self::Busy => 409,
            _ => self.class().status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            CompileError::Timeout(Duration::from_secs(30)).to_string(),
            "compilation timed out after 30s"
        );
        assert_eq!(CompileError::ArtifactMissing.to_string(), "artifact not produced");
        assert_eq!(
            CompileError::Failed("! Emergency stop.".into()).to_string(),
            "! Emergency stop."
        );
    }

    #[test]
    fn test_busy_is_conflict() {
        assert_eq!(CompileError::Busy.status_code(), 409);
        assert_eq!(CompileError::ArtifactMissing.status_code(), 422);
    }
}
