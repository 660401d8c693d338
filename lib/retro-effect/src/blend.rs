use image::Rgba;

/// Straight (non-premultiplied) color with a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;

        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    SourceOver,
    Multiply,
}

impl BlendMode {
    fn mix(self, source: f32, backdrop: f32) -> f32 {
        match self {
            BlendMode::SourceOver => source,
            BlendMode::Multiply => source * backdrop,
        }
    }
}

/// Composite `source` over `pixel` with the given coverage (0..=1).
pub fn blend_pixel(pixel: &mut Rgba<u8>, source: Color, coverage: f32, mode: BlendMode) {
    let alpha_s = (source.a * coverage).clamp(0.0, 1.0);
    if alpha_s <= 0.0 {
        return;
    }

    let alpha_b = pixel[3] as f32 / 255.0;
    let alpha_o = alpha_s + alpha_b * (1.0 - alpha_s);
    let source_rgb = [source.r, source.g, source.b];

    for (channel, src) in source_rgb.into_iter().enumerate() {
        let cs = src as f32 / 255.0;
        let cb = pixel[channel] as f32 / 255.0;

        // Blended source, weighted by how much backdrop there is to blend with.
        let cs_blended = (1.0 - alpha_b) * cs + alpha_b * mode.mix(cs, cb);
        let premultiplied = alpha_s * cs_blended + alpha_b * cb * (1.0 - alpha_s);
        pixel[channel] = to_u8(premultiplied / alpha_o);
    }

    pixel[3] = to_u8(alpha_o);
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_over_opaque_replaces() {
        let mut pixel = Rgba([10, 20, 30, 255]);
        blend_pixel(&mut pixel, Color::rgb(255, 0, 0), 1.0, BlendMode::SourceOver);
        assert_eq!(pixel, Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_source_over_half_black_darkens() {
        let mut pixel = Rgba([200, 100, 50, 255]);
        blend_pixel(&mut pixel, Color::BLACK.with_alpha(0.5), 1.0, BlendMode::SourceOver);
        assert_eq!(pixel, Rgba([100, 50, 25, 255]));
    }

    #[test]
    fn test_multiply_with_white_is_identity() {
        let mut pixel = Rgba([120, 60, 30, 255]);
        blend_pixel(&mut pixel, Color::rgb(255, 255, 255), 1.0, BlendMode::Multiply);
        assert_eq!(pixel, Rgba([120, 60, 30, 255]));
    }

    #[test]
    fn test_multiply_tints_toward_source() {
        let mut pixel = Rgba([200, 200, 200, 255]);
        blend_pixel(&mut pixel, Color::rgba(255, 182, 193, 0.3), 1.0, BlendMode::Multiply);

        assert_eq!(pixel[0], 200);
        assert!(pixel[1] < 200 && pixel[2] < 200);
        assert!(pixel[1] < pixel[2]);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn test_zero_coverage_is_noop() {
        let mut pixel = Rgba([1, 2, 3, 4]);
        blend_pixel(&mut pixel, Color::rgb(255, 255, 255), 0.0, BlendMode::SourceOver);
        assert_eq!(pixel, Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_onto_transparent_takes_source() {
        let mut pixel = Rgba([0, 0, 0, 0]);
        blend_pixel(&mut pixel, Color::rgba(255, 0, 0, 0.5), 1.0, BlendMode::Multiply);
        assert_eq!(pixel, Rgba([255, 0, 0, 128]));
    }

    #[test]
    fn test_color_lerp() {
        let mid = Color::rgba(0, 0, 0, 0.0).lerp(Color::rgba(200, 100, 50, 1.0), 0.5);
        assert_eq!((mid.r, mid.g, mid.b), (100, 50, 25));
        assert!((mid.a - 0.5).abs() < 1e-6);
    }
}
