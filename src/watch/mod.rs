//! Edit-driven compiles.
//!
//! ```text
//! PUT /api/files/..  ─────────────────────────┐
//! notify ─► thread ─► FileWatcher (settle) ───┴─► CompileScheduler ─► auto_compile_if_changed()
//!                         └─► rebuild index        (quiet period, abortable timer)
//! ```

mod scheduler;
mod watcher;

pub use scheduler::CompileScheduler;
pub use watcher::FileWatcher;
