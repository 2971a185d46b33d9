//! Core types shared across the codebase.

mod error;
mod state;

pub use error::{Classify, ErrorClass};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
