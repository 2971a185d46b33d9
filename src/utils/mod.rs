//! Utility modules.

pub mod exec;
pub mod mime;
pub mod path;
pub mod time;
