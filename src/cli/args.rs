//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// texpane live preview CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: texpane.toml)
    #[arg(short = 'C', long, default_value = "texpane.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Workspace directory holding the source files (overrides config)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub workspace: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the preview server
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        compile_args: CompileArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Recompile when files change outside the browser
        #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Compile once and exit
    #[command(visible_alias = "c")]
    Compile {
        #[command(flatten)]
        compile_args: CompileArgs,

        /// Compile even if no source changed since the last artifact
        #[arg(short, long)]
        force: bool,
    },

    /// Look up where a piece of rendered text comes from
    #[command(visible_alias = "l")]
    Locate {
        /// Text as it appears in the rendered document
        #[arg(required = true)]
        text: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show tracked files and artifact state
    Status {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Shared compile arguments for Serve and Compile commands
#[derive(clap::Args, Debug, Clone)]
pub struct CompileArgs {
    /// Main source file handed to the compiler
    #[arg(short, long)]
    pub main: Option<String>,

    /// Compiler timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

impl Cli {
    pub fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}
