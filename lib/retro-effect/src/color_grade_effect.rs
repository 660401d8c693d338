use crate::{
    BlendMode, Color, ColorStop, Effect, EffectResult, GradientStops, blend::blend_pixel,
};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;

/// Diagonal gradient from the top-left to the bottom-right corner, blended
/// over the whole image. Multiply gives the retro color cast.
#[derive(Debug, Clone, PartialEq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct ColorGradeConfig {
    stops: GradientStops,

    #[derivative(Default(value = "BlendMode::Multiply"))]
    mode: BlendMode,
}

impl ColorGradeConfig {
    pub fn new(stops: GradientStops) -> Self {
        Self::default().with_stops(stops)
    }

    pub fn from_stops(stops: Vec<ColorStop>) -> EffectResult<Self> {
        Ok(Self::new(GradientStops::new(stops)?))
    }

    pub fn stops(&self) -> &GradientStops {
        &self.stops
    }

    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    /// Gradient position of the pixel centred at `(x, y)`.
    fn position(x: u32, y: u32, width: f32, height: f32) -> f32 {
        let length_sq = width * width + height * height;
        if length_sq <= 0.0 {
            return 0.0;
        }

        ((x as f32 + 0.5) * width + (y as f32 + 0.5) * height) / length_sq
    }
}

impl Effect for ColorGradeConfig {
    fn apply(&self, image: &mut RgbaImage) -> EffectResult<()> {
        let (width, height) = (image.width() as f32, image.height() as f32);

        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let color: Color = self.stops.sample(Self::position(x, y, width, height));
            blend_pixel(pixel, color, 1.0, self.mode);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn pink_to_violet() -> ColorGradeConfig {
        ColorGradeConfig::from_stops(vec![
            ColorStop::new(0.0, Color::rgba(255, 182, 193, 0.3)),
            ColorStop::new(1.0, Color::rgba(147, 112, 219, 0.3)),
        ])
        .unwrap()
    }

    #[test]
    fn test_color_grade_casts_toward_gradient() {
        let mut image = RgbaImage::from_pixel(64, 48, Rgba([200, 200, 200, 255]));
        pink_to_violet().apply(&mut image).unwrap();

        let top_left = *image.get_pixel(0, 0);
        let bottom_right = *image.get_pixel(63, 47);

        // Pink keeps red, violet keeps blue.
        assert!(top_left[0] > top_left[2]);
        assert!(bottom_right[2] > bottom_right[0]);
        assert!(image.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_color_grade_never_brightens_under_multiply() {
        let mut image = RgbaImage::from_fn(32, 32, |x, y| Rgba([(x * 8) as u8, (y * 8) as u8, 128, 255]));
        let original = image.clone();
        pink_to_violet().apply(&mut image).unwrap();

        for (after, before) in image.pixels().zip(original.pixels()) {
            for c in 0..3 {
                assert!(after[c] <= before[c]);
            }
        }
    }

    #[test]
    fn test_default_is_neutral_multiply() {
        let config = ColorGradeConfig::default();
        assert_eq!(config.mode(), BlendMode::Multiply);

        let mut image = RgbaImage::from_pixel(16, 16, Rgba([90, 120, 150, 255]));
        let original = image.clone();
        config.apply(&mut image).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_source_over_mode_paints_gradient() {
        let config = ColorGradeConfig::default()
            .with_stops(GradientStops::new(vec![ColorStop::new(0.0, Color::rgb(255, 0, 0))]).unwrap())
            .with_mode(BlendMode::SourceOver);

        let mut image = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255]));
        config.apply(&mut image).unwrap();
        assert!(image.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_position_runs_corner_to_corner() {
        assert!(ColorGradeConfig::position(0, 0, 100.0, 100.0) < 0.01);
        assert!(ColorGradeConfig::position(99, 99, 100.0, 100.0) > 0.99);
        assert_eq!(ColorGradeConfig::position(0, 0, 0.0, 0.0), 0.0);
    }
}
