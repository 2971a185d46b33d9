//! Rendering boundary.
//!
//! Rasterizing the artifact belongs to an external rendering library. This
//! module fixes the contract ([`RenderingAdapter`]), the render settings
//! (zoom and rotation) and a [`PreviewSession`] that decides when pages
//! must be rendered again.

mod session;
mod settings;

pub use session::{PreviewSession, RenderedPage};
pub use settings::{PageSize, RenderConfig, Rotation, Viewport, ZoomMode};

use serde::Serialize;

/// A run of text as placed on a rendered page, in scaled page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedTextRun {
    pub text: String,
    pub page_index: usize,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

/// Implemented by the rendering library.
pub trait RenderingAdapter {
    type Error: std::error::Error + Send + Sync + 'static;

    fn page_count(&self, artifact: &[u8]) -> Result<usize, Self::Error>;

    /// Unscaled, unrotated page size in points.
    fn page_size(&self, artifact: &[u8], page: usize) -> Result<PageSize, Self::Error>;

    /// Render one page and return its text layer.
    fn text_runs(
        &self,
        artifact: &[u8],
        page: usize,
        scale: f32,
        rotation: Rotation,
    ) -> Result<Vec<PositionedTextRun>, Self::Error>;
}
