//! Command-line interface module.

mod args;
pub mod compile;
pub mod locate;
pub mod serve;
pub mod status;

pub use args::{Cli, CompileArgs, Commands};
