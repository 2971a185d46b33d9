//! Preview configuration management for `texpane.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── workspace  # [workspace]
//! │   ├── compile    # [compile]
//! │   ├── serve      # [serve]
//! │   └── correlate  # [correlate]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # PreviewConfig (this file)
//! ```
//!
//! A missing config file is not an error: the defaults describe a workspace
//! in the current directory with `main.tex` compiled by `pdflatex`.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{CompileConfig, CorrelateConfig, LandmarkConfig, ServeConfig, WorkspaceConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::{
    cli::{Cli, CompileArgs, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing texpane.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub compile: CompileConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub correlate: CorrelateConfig,
}

impl PreviewConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file; falls back to defaults
    /// rooted at cwd when none exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd.clone(),
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        config.finalize(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Apply CLI overrides and make all paths absolute.
    fn finalize(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        // CLI paths are relative to cwd, config paths to the config file
        if let Some(workspace) = &cli.workspace {
            self.workspace.root = crate::utils::path::normalize_path(workspace);
        }
        self.apply_command_options(cli);
        self.normalize_paths();
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Serve {
                compile_args,
                interface,
                port,
                watch,
            } => {
                self.apply_compile_args(compile_args);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
            Commands::Compile { compile_args, .. } => self.apply_compile_args(compile_args),
            Commands::Locate { .. } | Commands::Status { .. } => {}
        }
    }

    fn apply_compile_args(&mut self, args: &CompileArgs) {
        Self::update_option(&mut self.workspace.main, args.main.as_ref());
        Self::update_option(&mut self.compile.timeout_secs, args.timeout.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    fn normalize_paths(&mut self) {
        let root = crate::utils::path::normalize_path(&self.root);
        self.workspace.root = Self::resolve(&self.workspace.root, &root);
        if let Some(frontend) = self.serve.frontend.take() {
            self.serve.frontend = Some(Self::resolve(&frontend, &root));
        }
        self.root = root;
    }

    /// Expand `~` and resolve relative paths against `root`.
    fn resolve(path: &Path, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        let full_path = if path.is_relative() {
            root.join(&path)
        } else {
            path
        };
        crate::utils::path::normalize_path(&full_path)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate all sections, reporting every error at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.workspace.validate(&mut diag);
        self.compile.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.correlate.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config text, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PreviewConfig {
    let (parsed, ignored) = PreviewConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config rooted at `root`, with the workspace in `root` itself.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> PreviewConfig {
    let mut config = PreviewConfig {
        root: root.to_path_buf(),
        config_path: root.join("texpane.toml"),
        ..PreviewConfig::default()
    };
    config.workspace.root = root.to_path_buf();
    config
}

// ============================================================================
// tests
// ============================================================================
