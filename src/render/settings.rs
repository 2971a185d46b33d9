use serde::{Deserialize, Serialize};

/// Upper bound for [`ZoomMode::Auto`]: fit the width, but never blow small
/// pages up past this.
pub const AUTO_MAX_SCALE: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn rotated(self, rotation: Rotation) -> Self {
        if rotation.swaps_axes() {
            Self::new(self.height, self.width)
        } else {
            self
        }
    }
}

/// Area available for one page.
pub type Viewport = PageSize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "scale")]
pub enum ZoomMode {
    Scale(f32),
    FitPage,
    FitWidth,
    #[default]
    Auto,
}

impl ZoomMode {
    /// Effective scale of `page` inside `viewport`.
    ///
    /// A degenerate page (zero width or height) renders at 1.0.
    pub fn resolve(self, page: PageSize, viewport: Viewport) -> f32 {
        if page.width <= 0.0 || page.height <= 0.0 {
            return 1.0;
        }
        let width_ratio = viewport.width / page.width;
        let height_ratio = viewport.height / page.height;
        match self {
            Self::Scale(scale) => scale,
            Self::FitPage => width_ratio.min(height_ratio),
            Self::FitWidth => width_ratio,
            Self::Auto => width_ratio.min(AUTO_MAX_SCALE),
        }
    }

    pub const fn depends_on_viewport(self) -> bool {
        !matches!(self, Self::Scale(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Next quarter turn clockwise.
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees).ok_or_else(|| format!("invalid rotation {degrees}"))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub zoom: ZoomMode,
    pub rotation: Rotation,
}

impl RenderConfig {
    /// Change the zoom, keeping the rotation.
    pub fn set_zoom(&mut self, zoom: ZoomMode) {
        self.zoom = zoom;
    }

    /// Rotate a quarter turn clockwise, keeping the zoom.
    pub fn rotate(&mut self) {
        self.rotation = self.rotation.clockwise();
    }

    pub fn depends_on_viewport(&self) -> bool {
        self.zoom.depends_on_viewport()
    }

    /// Scale for `page` as displayed, after rotation.
    pub fn scale_for(&self, page: PageSize, viewport: Viewport) -> f32 {
        self.zoom.resolve(page.rotated(self.rotation), viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: PageSize = PageSize::new(595.0, 842.0);

    #[test]
    fn test_resolve_modes() {
        let viewport = PageSize::new(1190.0, 842.0);
        assert_eq!(ZoomMode::Scale(0.75).resolve(A4, viewport), 0.75);
        assert_eq!(ZoomMode::FitWidth.resolve(A4, viewport), 2.0);
        assert_eq!(ZoomMode::FitPage.resolve(A4, viewport), 1.0);
        assert_eq!(ZoomMode::Auto.resolve(A4, viewport), AUTO_MAX_SCALE);

        let narrow = PageSize::new(297.5, 842.0);
        assert_eq!(ZoomMode::Auto.resolve(A4, narrow), 0.5);
    }

    #[test]
    fn test_degenerate_page() {
        let viewport = PageSize::new(800.0, 600.0);
        assert_eq!(ZoomMode::FitPage.resolve(PageSize::new(0.0, 10.0), viewport), 1.0);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let mut config = RenderConfig {
            zoom: ZoomMode::FitWidth,
            rotation: Rotation::Deg0,
        };
        let viewport = PageSize::new(842.0, 2000.0);
        let upright = config.scale_for(A4, viewport);

        config.rotate();
        assert_eq!(config.rotation, Rotation::Deg90);
        assert_eq!(config.scale_for(A4, viewport), 1.0);
        assert_ne!(upright, 1.0);

        config.rotate();
        assert_eq!(config.scale_for(A4, viewport), upright);
    }

    #[test]
    fn test_zoom_and_rotation_independent() {
        let mut config = RenderConfig::default();
        config.rotate();
        config.set_zoom(ZoomMode::Scale(2.0));
        assert_eq!(config.rotation, Rotation::Deg90);

        config.rotate();
        assert_eq!(config.zoom, ZoomMode::Scale(2.0));
        assert_eq!(config.rotation, Rotation::Deg180);
    }

    #[test]
    fn test_depends_on_viewport() {
        assert!(!ZoomMode::Scale(1.0).depends_on_viewport());
        assert!(ZoomMode::FitPage.depends_on_viewport());
        assert!(ZoomMode::FitWidth.depends_on_viewport());
        assert!(ZoomMode::Auto.depends_on_viewport());
    }

    #[test]
    fn test_rotation_cycle_and_serde() {
        assert_eq!(Rotation::Deg270.clockwise(), Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(serde_json::to_string(&Rotation::Deg180).unwrap(), "180");
        assert!(serde_json::from_str::<Rotation>("45").is_err());

        let zoom: ZoomMode = serde_json::from_str(r#"{"mode":"scale","scale":1.25}"#).unwrap();
        assert_eq!(zoom, ZoomMode::Scale(1.25));
    }
}
