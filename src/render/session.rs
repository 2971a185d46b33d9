//! Rendered pages of one artifact.

use std::sync::Arc;

use super::{PageSize, PositionedTextRun, RenderConfig, RenderingAdapter, Viewport, ZoomMode};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub index: usize,
    pub size: PageSize,
    pub scale: f32,
    pub runs: Vec<PositionedTextRun>,
}

/// Keeps the current artifact rendered under the current settings.
///
/// Zoom and rotation changes always re-render; a viewport resize only does
/// when the zoom mode is derived from the viewport.
pub struct PreviewSession<A> {
    adapter: A,
    config: RenderConfig,
    viewport: Viewport,
    artifact: Option<Arc<[u8]>>,
    pages: Vec<RenderedPage>,
}

impl<A: RenderingAdapter> PreviewSession<A> {
    pub fn new(adapter: A, config: RenderConfig, viewport: Viewport) -> Self {
        Self {
            adapter,
            config,
            viewport,
            artifact: None,
            pages: Vec::new(),
        }
    }

    pub fn config(&self) -> RenderConfig {
        self.config
    }

    pub fn pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    /// All text runs, page by page.
    pub fn text_runs(&self) -> impl Iterator<Item = &PositionedTextRun> {
        self.pages.iter().flat_map(|p| p.runs.iter())
    }

    /// Replace the artifact (after a successful compile) and render it.
    pub fn load(&mut self, artifact: impl Into<Arc<[u8]>>) -> Result<(), A::Error> {
        self.artifact = Some(artifact.into());
        self.render().map(|_| ())
    }

    pub fn set_zoom(&mut self, zoom: ZoomMode) -> Result<(), A::Error> {
        self.config.set_zoom(zoom);
        self.render().map(|_| ())
    }

    pub fn rotate(&mut self) -> Result<(), A::Error> {
        self.config.rotate();
        self.render().map(|_| ())
    }

    /// Returns whether the pages were rendered again.
    pub fn resize(&mut self, viewport: Viewport) -> Result<bool, A::Error> {
        if viewport == self.viewport {
            return Ok(false);
        }
        self.viewport = viewport;
        if !self.config.depends_on_viewport() {
            return Ok(false);
        }
        self.render()
    }

    /// Returns `false` when no artifact is loaded yet.
    fn render(&mut self) -> Result<bool, A::Error> {
        let Some(artifact) = self.artifact.clone() else {
            return Ok(false);
        };

        let count = self.adapter.page_count(&artifact)?;
        let mut pages = Vec::with_capacity(count);
        for index in 0..count {
            let size = self.adapter.page_size(&artifact, index)?;
            let scale = self.config.scale_for(size, self.viewport);
            let runs = self
                .adapter
                .text_runs(&artifact, index, scale, self.config.rotation)?;
            pages.push(RenderedPage {
                index,
                size,
                scale,
                runs,
            });
        }

        // only replace once every page rendered
        self.pages = pages;
        Ok(true)
    }
}
