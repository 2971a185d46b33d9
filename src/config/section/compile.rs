//! `[compile]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [compile]
//! command = ["latexmk", "-pdf", "-outdir={outdir}", "{main}"]
//! artifact_ext = "pdf"
//! timeout_secs = 30
//! debounce_ms = 1000
//! ```
//!
//! Placeholders in `command`:
//!
//! | Placeholder | Value                                  |
//! |-------------|----------------------------------------|
//! | `{main}`    | main file name (`main.tex`)            |
//! | `{stem}`    | main file stem (`main`)                |
//! | `{outdir}`  | absolute build output directory        |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Program followed by its arguments.
    pub command: Vec<String>,

    /// Extension of the produced artifact.
    pub artifact_ext: String,

    /// Hard wall-clock limit for one compiler invocation.
    pub timeout_secs: u64,

    /// Quiet period after the last edit before an automatic compile.
    pub debounce_ms: u64,
}

impl CompileConfig {
    pub const COMMAND: FieldPath = FieldPath::new("compile.command");
    pub const TIMEOUT: FieldPath = FieldPath::new("compile.timeout_secs");
    pub const ARTIFACT_EXT: FieldPath = FieldPath::new("compile.artifact_ext");

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Program name (first element of `command`).
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.command.first().is_none_or(|p| p.trim().is_empty()) {
            diag.error_with_hint(
                Self::COMMAND,
                "command must name a program",
                "command = [\"pdflatex\", \"-interaction=nonstopmode\", \"{main}\"]",
            );
        }
        if self.timeout_secs == 0 {
            diag.error(Self::TIMEOUT, "timeout must be greater than zero");
        }
        if self.artifact_ext.is_empty() || self.artifact_ext.starts_with('.') {
            diag.error(Self::ARTIFACT_EXT, "artifact extension must be non-empty, without a leading dot");
        }
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "pdflatex".into(),
                "-interaction=nonstopmode".into(),
                "-halt-on-error".into(),
                "-output-directory={outdir}".into(),
                "{main}".into(),
            ],
            artifact_ext: "pdf".into(),
            timeout_secs: 30,
            debounce_ms: 1000,
        }
    }
}
