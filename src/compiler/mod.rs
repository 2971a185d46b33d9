//! Compile orchestration.
//!
//! ```text
//! compiler/
//! ├── status.rs        # CompileState, CompileStatus
//! ├── artifact.rs      # ArtifactStore (current artifact, atomic publish)
//! ├── error.rs         # CompileError
//! └── orchestrator.rs  # Orchestrator (busy gate, timeout, watermark)
//! ```
//!
//! One [`Orchestrator`] exists per workspace. It is the only writer of the
//! compile status and of the artifact; everything else reads snapshots.

mod artifact;
mod error;
mod orchestrator;
mod status;


pub use artifact::{Artifact, ArtifactError, ArtifactStore};
pub use error::CompileError;
pub use orchestrator::{AutoCompileResult, CompileOutcome, Orchestrator};
pub use status::{CompileState, CompileStatus};
