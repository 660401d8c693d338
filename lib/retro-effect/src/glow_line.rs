use crate::{BlendMode, Color, Effect, EffectError, EffectResult, blend::blend_pixel};
use image::{GrayImage, Luma, RgbaImage};
use imageproc::filter::gaussian_blur_f32;

const CURVE_SEGMENTS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: StrokePoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokePath {
    Straight,
    Cubic {
        control1: StrokePoint,
        control2: StrokePoint,
    },
}

/// One pass of a stroke. `blur` is a canvas-style shadow blur: a Gaussian
/// with sigma `blur / 2` drawn in the stroke color under the stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeLayer {
    pub width: f32,
    pub blur: f32,
    pub color: Color,
}

/// Three concentric passes, widest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub layers: [StrokeLayer; 3],
}

impl StrokeStyle {
    pub const RED_LINE: StrokeStyle = StrokeStyle {
        layers: [
            StrokeLayer {
                width: 6.0,
                blur: 15.0,
                color: Color::rgb(0xff, 0x00, 0x00),
            },
            StrokeLayer {
                width: 3.0,
                blur: 0.0,
                color: Color::rgb(0xff, 0x66, 0x66),
            },
            StrokeLayer {
                width: 1.0,
                blur: 0.0,
                color: Color::rgb(0xff, 0xcc, 0xcc),
            },
        ],
    };
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::RED_LINE
    }
}

/// One glow mark on the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStroke {
    pub start: StrokePoint,
    pub end: StrokePoint,
    pub path: StrokePath,
    pub style: StrokeStyle,
}

impl LineStroke {
    pub fn straight(start: StrokePoint, end: StrokePoint) -> Self {
        Self {
            start,
            end,
            path: StrokePath::Straight,
            style: StrokeStyle::RED_LINE,
        }
    }

    pub fn curved(
        start: StrokePoint,
        control1: StrokePoint,
        control2: StrokePoint,
        end: StrokePoint,
    ) -> Self {
        Self {
            start,
            end,
            path: StrokePath::Cubic { control1, control2 },
            style: StrokeStyle::RED_LINE,
        }
    }

    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn is_finite(&self) -> bool {
        let controls_finite = match self.path {
            StrokePath::Straight => true,
            StrokePath::Cubic { control1, control2 } => {
                control1.is_finite() && control2.is_finite()
            }
        };

        self.start.is_finite() && self.end.is_finite() && controls_finite
    }

    /// Straight-line distance between the end points.
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Points along the stroke, end points included.
    pub fn polyline(&self) -> Vec<StrokePoint> {
        match self.path {
            StrokePath::Straight => vec![self.start, self.end],
            StrokePath::Cubic { control1, control2 } => (0..=CURVE_SEGMENTS)
                .map(|i| {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    cubic_point(self.start, control1, control2, self.end, t)
                })
                .collect(),
        }
    }

    fn validate(&self) -> EffectResult<()> {
        if !self.is_finite() {
            return Err(EffectError::InvalidParameter(format!(
                "non-finite stroke geometry: {self:?}"
            )));
        }

        for layer in &self.style.layers {
            let width_ok = layer.width.is_finite() && layer.width > 0.0;
            let blur_ok = layer.blur.is_finite() && layer.blur >= 0.0;
            if !width_ok || !blur_ok {
                return Err(EffectError::InvalidParameter(format!(
                    "bad stroke layer: {layer:?}"
                )));
            }
        }

        Ok(())
    }
}

fn cubic_point(p0: StrokePoint, p1: StrokePoint, p2: StrokePoint, p3: StrokePoint, t: f32) -> StrokePoint {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);

    StrokePoint::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

fn distance_to_segment(p: StrokePoint, a: StrokePoint, b: StrokePoint) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    p.distance(StrokePoint::new(a.x + t * dx, a.y + t * dy))
}

/// Pixel rectangle a layer can touch, already clipped to the image.
#[derive(Debug, Clone, Copy)]
struct Area {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl Area {
    fn around(points: &[StrokePoint], margin: f32, image_width: u32, image_height: u32) -> Option<Self> {
        let min_x = points.iter().map(|p| p.x).reduce(f32::min)? - margin;
        let max_x = points.iter().map(|p| p.x).reduce(f32::max)? + margin;
        let min_y = points.iter().map(|p| p.y).reduce(f32::min)? - margin;
        let max_y = points.iter().map(|p| p.y).reduce(f32::max)? + margin;

        let x0 = min_x.floor().clamp(0.0, image_width as f32) as u32;
        let x1 = max_x.ceil().clamp(0.0, image_width as f32) as u32;
        let y0 = min_y.floor().clamp(0.0, image_height as f32) as u32;
        let y1 = max_y.ceil().clamp(0.0, image_height as f32) as u32;

        (x1 > x0 && y1 > y0).then_some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

fn coverage_mask(polyline: &[StrokePoint], half_width: f32, area: &Area) -> GrayImage {
    GrayImage::from_fn(area.width, area.height, |x, y| {
        let p = StrokePoint::new((area.x + x) as f32 + 0.5, (area.y + y) as f32 + 0.5);
        let distance = polyline
            .windows(2)
            .map(|s| distance_to_segment(p, s[0], s[1]))
            .fold(f32::INFINITY, f32::min);

        let coverage = (half_width + 0.5 - distance).clamp(0.0, 1.0);
        Luma([(coverage * 255.0).round() as u8])
    })
}

fn composite_mask(image: &mut RgbaImage, mask: &GrayImage, area: &Area, color: Color) {
    for (x, y, value) in mask.enumerate_pixels() {
        if value[0] == 0 {
            continue;
        }

        let pixel = image.get_pixel_mut(area.x + x, area.y + y);
        blend_pixel(pixel, color, value[0] as f32 / 255.0, BlendMode::SourceOver);
    }
}

fn render_layer(image: &mut RgbaImage, polyline: &[StrokePoint], layer: &StrokeLayer) {
    let half_width = layer.width / 2.0;
    let sigma = layer.blur / 2.0;
    let margin = half_width + 1.0 + if sigma > 0.0 { (sigma * 3.0).ceil() } else { 0.0 };

    let Some(area) = Area::around(polyline, margin, image.width(), image.height()) else {
        return;
    };

    let mask = coverage_mask(polyline, half_width, &area);
    if sigma > 0.0 {
        let shadow = gaussian_blur_f32(&mask, sigma);
        composite_mask(image, &shadow, &area, layer.color);
    }

    composite_mask(image, &mask, &area, layer.color);
}

pub fn render_stroke(image: &mut RgbaImage, stroke: &LineStroke) -> EffectResult<()> {
    stroke.validate()?;

    let polyline = stroke.polyline();
    for layer in &stroke.style.layers {
        render_layer(image, &polyline, layer);
    }

    Ok(())
}

/// Renders strokes in order, each as its three passes.
#[derive(Debug, Clone, Copy)]
pub struct GlowLines<'a> {
    strokes: &'a [LineStroke],
}

impl<'a> GlowLines<'a> {
    pub fn new(strokes: &'a [LineStroke]) -> Self {
        Self { strokes }
    }
}

impl Effect for GlowLines<'_> {
    fn apply(&self, image: &mut RgbaImage) -> EffectResult<()> {
        for stroke in self.strokes {
            render_stroke(image, stroke)?;
        }

        Ok(())
    }
}
