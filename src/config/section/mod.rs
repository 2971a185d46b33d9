//! Configuration section definitions.
//!
//! Each module corresponds to a section in `texpane.toml`:
//!
//! | Module      | TOML Section    | Purpose                              |
//! |-------------|-----------------|--------------------------------------|
//! | `workspace` | `[workspace]`   | Source root, main file, extensions   |
//! | `compile`   | `[compile]`     | External compiler, timeout, debounce |
//! | `serve`     | `[serve]`       | Preview server                       |
//! | `correlate` | `[correlate]`   | Curated landmarks, tooltip timing    |

mod compile;
mod correlate;
mod serve;
mod workspace;

pub use compile::CompileConfig;
pub use correlate::{CorrelateConfig, LandmarkConfig};
pub use serve::ServeConfig;
pub use workspace::WorkspaceConfig;
