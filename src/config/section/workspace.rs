//! `[workspace]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [workspace]
//! root = "."                  # Directory holding the source files
//! main = "main.tex"           # File handed to the compiler
//! extensions = ["tex", "sty"] # Editable/tracked file extensions
//! state_dir = ".texpane"      # Build output, artifact and backups
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Source directory (relative to the config file).
    pub root: PathBuf,

    /// Main source file name, relative to `root`.
    pub main: String,

    /// Extension allow-list for tracked and writable files (no leading dot).
    pub extensions: Vec<String>,

    /// Directory for build output, the current artifact and backups,
    /// relative to `root`.
    pub state_dir: PathBuf,
}

impl WorkspaceConfig {
    pub const MAIN: FieldPath = FieldPath::new("workspace.main");
    pub const EXTENSIONS: FieldPath = FieldPath::new("workspace.extensions");

    /// Absolute path of the state directory.
    pub fn state_path(&self) -> PathBuf {
        self.root.join(&self.state_dir)
    }

    /// Stem of the main file, which names the artifact.
    pub fn main_stem(&self) -> &str {
        Path::new(&self.main)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.main)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error(Self::EXTENSIONS, "at least one extension is required");
        }
        for ext in &self.extensions {
            if ext.starts_with('.') || ext.is_empty() {
                diag.error_with_hint(
                    Self::EXTENSIONS,
                    format!("invalid extension `{ext}`"),
                    "write extensions without the leading dot, e.g. \"tex\"",
                );
            }
        }

        let main_ext = Path::new(&self.main)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !self.extensions.iter().any(|e| e == main_ext) {
            diag.error(
                Self::MAIN,
                format!("`{}` does not have a tracked extension", self.main),
            );
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            main: "main.tex".into(),
            extensions: vec!["tex".into(), "sty".into()],
            state_dir: PathBuf::from(".texpane"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_workspace_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.workspace.main, "main.tex");
        assert_eq!(config.workspace.main_stem(), "main");
        assert_eq!(config.workspace.extensions, vec!["tex", "sty"]);
    }

    #[test]
    fn test_workspace_main_must_be_tracked() {
        let config = test_parse_config("[workspace]\nmain = \"resume.md\"");
        let mut diag = ConfigDiagnostics::new();
        config.workspace.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
    }

    #[test]
    fn test_workspace_rejects_dotted_extension() {
        let config = test_parse_config("[workspace]\nextensions = [\".tex\", \"sty\"]\nmain = \"cv.sty\"");
        let mut diag = ConfigDiagnostics::new();
        config.workspace.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
    }
}
