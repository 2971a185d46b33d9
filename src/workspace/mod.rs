//! Workspace source files.
//!
//! A workspace is one directory of markup sources. Only files directly in
//! the root whose extension is on the allow-list are tracked, read or
//! written; everything the preview pipeline produces lives in the state
//! directory below the root.
//!
//! ```text
//! resume/
//! ├── main.tex            # tracked
//! ├── skills.tex          # tracked
//! ├── resume.sty          # tracked
//! ├── photo.jpg           # ignored
//! └── .texpane/
//!     ├── build/          # compiler output directory
//!     ├── backup/         # prior content of every overwritten file
//!     └── main.pdf        # current artifact
//! ```

mod context;
mod error;
mod store;

pub use context::Workspace;
pub use error::StoreError;
pub use store::{SourceFile, SourceStore};
