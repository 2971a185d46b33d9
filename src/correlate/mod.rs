//! Rendered-text → source correlation.
//!
//! The compiler gives no source map, so correlation is a best-effort
//! heuristic: text fragments of the rendered document are looked up in an
//! index built from the sources themselves.
//!
//! ```text
//! landmarks ([[correlate.landmark]])   ─┐
//!                                       ├─► CorrelationIndex ─► InteractionController
//! brace scan (every tracked file)      ─┘      (scan wins)        click → Jump / Miss
//! ```
//!
//! A fragment that does not appear verbatim inside a brace group (text
//! produced by macros, hyphenated across lines, split over runs) has no
//! entry and yields a miss.

mod controller;
mod index;
mod landmark;
mod scan;

pub use controller::{ClickOutcome, InteractionController, InteractionMode, JumpEffects, Tooltip};
pub use index::{CorrelationIndex, SourceLocation, normalize};
pub use landmark::Landmark;
