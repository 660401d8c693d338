use crate::{
    ColorGradeConfig, Effect, EffectError, EffectResult, GlowLines, LineStroke, RetroProfile,
    VignetteConfig,
};
use derive_setters::Setters;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Largest raster a surface may be acquired for.
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 8192 * 8192;

/// The raster one capture is built on. Exclusively owned by that capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSurface {
    image: RgbaImage,
}

impl CompositeSurface {
    pub fn acquire(width: u32, height: u32, max_pixels: u64) -> EffectResult<Self> {
        let pixels = width as u64 * height as u64;

        if pixels == 0 {
            return Err(EffectError::SurfaceUnavailable(format!(
                "empty surface {width}x{height}"
            )));
        }

        if pixels > max_pixels {
            return Err(EffectError::SurfaceUnavailable(format!(
                "surface {width}x{height} exceeds {max_pixels} pixels"
            )));
        }

        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Replaces every pixel with the frame's.
    pub fn draw_frame(&mut self, frame: &RgbaImage) -> EffectResult<()> {
        if frame.dimensions() != self.image.dimensions() {
            return Err(EffectError::InvalidParameter(format!(
                "frame {:?} does not match surface {:?}",
                frame.dimensions(),
                self.image.dimensions()
            )));
        }

        self.image.copy_from_slice(frame.as_raw());
        Ok(())
    }

    pub fn encode_png(&self) -> EffectResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Base frame, color grade, glow lines, vignette, in that order.
///
/// Holds no randomness: the same frame and strokes always give the same
/// pixels.
#[derive(Debug, Clone, PartialEq, Setters)]
#[setters(prefix = "with_")]
pub struct Compositor {
    color_grade: ColorGradeConfig,
    vignette: VignetteConfig,
    max_surface_pixels: u64,
}

impl Compositor {
    pub fn new(color_grade: ColorGradeConfig, vignette: VignetteConfig) -> Self {
        Self {
            color_grade,
            vignette,
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
        }
    }

    pub fn from_profile(profile: RetroProfile) -> EffectResult<Self> {
        Ok(Self::new(profile.color_grade()?, profile.vignette()?))
    }

    pub fn max_surface_pixels(&self) -> u64 {
        self.max_surface_pixels
    }

    pub fn acquire_surface(&self, width: u32, height: u32) -> EffectResult<CompositeSurface> {
        CompositeSurface::acquire(width, height, self.max_surface_pixels)
    }

    /// Every pass after the base frame. On error the surface is left partly
    /// drawn; callers redraw the frame to recover.
    pub fn render_layers(
        &self,
        surface: &mut CompositeSurface,
        strokes: &[LineStroke],
    ) -> EffectResult<()> {
        let image = surface.image_mut();

        self.color_grade.apply(image)?;
        GlowLines::new(strokes).apply(image)?;
        self.vignette.apply(image)?;

        Ok(())
    }

    pub fn compose(&self, frame: &RgbaImage, strokes: &[LineStroke]) -> EffectResult<CompositeSurface> {
        let mut surface = self.acquire_surface(frame.width(), frame.height())?;
        surface.draw_frame(frame)?;
        self.render_layers(&mut surface, strokes)?;

        log::debug!(
            "composed {}x{} surface with {} strokes",
            frame.width(),
            frame.height(),
            strokes.len()
        );
        Ok(surface)
    }
}
