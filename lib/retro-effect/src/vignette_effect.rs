use crate::{BlendMode, Color, ColorStop, Effect, EffectResult, GradientStops, blend::blend_pixel};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;

/// Radial darkening: transparent at the centre, more opaque toward the
/// corners. The radius is half the larger image dimension; pixels beyond it
/// keep the outermost stop.
#[derive(Debug, Clone, PartialEq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct VignetteConfig {
    stops: GradientStops,
}

impl VignetteConfig {
    pub fn new(stops: GradientStops) -> Self {
        Self::default().with_stops(stops)
    }

    /// Black with the given `(offset, alpha)` stops.
    pub fn from_alpha_stops(stops: &[(f32, f32)]) -> EffectResult<Self> {
        let stops = stops
            .iter()
            .map(|&(offset, alpha)| ColorStop::new(offset, Color::BLACK.with_alpha(alpha)))
            .collect();

        Ok(Self::new(GradientStops::new(stops)?))
    }

    pub fn stops(&self) -> &GradientStops {
        &self.stops
    }
}

impl Effect for VignetteConfig {
    fn apply(&self, image: &mut RgbaImage) -> EffectResult<()> {
        let (width, height) = (image.width() as f32, image.height() as f32);
        let (center_x, center_y) = (width / 2.0, height / 2.0);
        let radius = width.max(height) / 2.0;
        if radius <= 0.0 {
            return Ok(());
        }

        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let dx = x as f32 + 0.5 - center_x;
            let dy = y as f32 + 0.5 - center_y;
            let distance = (dx * dx + dy * dy).sqrt();

            let color = self.stops.sample(distance / radius);
            blend_pixel(pixel, color, 1.0, BlendMode::SourceOver);
        }

        Ok(())
    }
}
