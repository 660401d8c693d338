pub mod blend;
pub mod color_grade_effect;
pub mod compositor;
pub mod glow_line;
pub mod gradient;
pub mod profile;
pub mod vignette_effect;

use image::RgbaImage;

pub use blend::{BlendMode, Color};
pub use color_grade_effect::ColorGradeConfig;
pub use compositor::{CompositeSurface, Compositor, DEFAULT_MAX_SURFACE_PIXELS};
pub use glow_line::{GlowLines, LineStroke, StrokeLayer, StrokePath, StrokePoint, StrokeStyle};
pub use gradient::{ColorStop, GradientStops};
pub use profile::RetroProfile;
pub use vignette_effect::VignetteConfig;

pub type EffectResult<T> = Result<T, EffectError>;

#[derive(thiserror::Error, Debug)]
pub enum EffectError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Rendering surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// One full-surface raster pass.
pub trait Effect {
    fn apply(&self, image: &mut RgbaImage) -> EffectResult<()>;
}
