//! Change detection for tracked sources.
//!
//! Freshness is judged purely by modification time against the watermark
//! of the last successful compile. The watermark is the instant that compile
//! *started*, so a save landing while the compiler runs still counts as new.

pub mod mtime;

pub use mtime::{get_mtime, needs_recompile};
