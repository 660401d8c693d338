//! Randomised glow-line placement.
//!
//! With a head region the lines hang above the head and drop to the
//! forehead. Without one they fall in a fixed band near the top centre of
//! the frame.

use derivative::Derivative;
use derive_setters::Setters;
use face_landmark::{HeadRegion, HeadStrategy};
use rand::Rng;
use retro_effect::{LineStroke, StrokePoint};
use serde::{Deserialize, Serialize};

/// Placement tunables. Pixel values are in frame coordinates; fractions are
/// shares of the frame or region size.
#[derive(Debug, Clone, PartialEq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct OverlayConfig {
    #[derivative(Default(value = "2"))]
    pub face_min_strokes: usize,

    #[derivative(Default(value = "5"))]
    pub face_max_strokes: usize,

    #[derivative(Default(value = "1"))]
    pub no_face_min_strokes: usize,

    #[derivative(Default(value = "3"))]
    pub no_face_max_strokes: usize,

    /// Anchor offset from the region centre, as a share of region width.
    #[derivative(Default(value = "0.3"))]
    pub anchor_spread: f32,

    #[derivative(Default(value = "80.0"))]
    pub brow_start_jitter: f32,

    #[derivative(Default(value = "100.0"))]
    pub jaw_start_jitter: f32,

    /// Upward jitter off the eyebrow line.
    #[derivative(Default(value = "10.0"))]
    pub brow_end_jitter: f32,

    /// Downward jitter off the head top.
    #[derivative(Default(value = "50.0"))]
    pub jaw_end_jitter: f32,

    #[derivative(Default(value = "15.0"))]
    pub control_jitter: f32,

    #[derivative(Default(value = "0.3"))]
    pub no_face_left: f32,

    #[derivative(Default(value = "0.7"))]
    pub no_face_right: f32,

    #[derivative(Default(value = "0.1"))]
    pub no_face_top: f32,

    #[derivative(Default(value = "0.4"))]
    pub no_face_bottom: f32,

    #[derivative(Default(value = "12.0"))]
    pub min_stroke_length: f32,
}

/// Which geometry produced an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    Face(HeadStrategy),
    NoFace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub mode: OverlayMode,
    pub strokes: Vec<LineStroke>,
}

#[derive(Debug, Clone, Default)]
pub struct OverlaySynthesizer {
    config: OverlayConfig,
}

impl OverlaySynthesizer {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Never fails. A degenerate region is treated as no region at all.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        region: Option<HeadRegion>,
        frame_size: (u32, u32),
        rng: &mut R,
    ) -> Overlay {
        let (width, height) = (frame_size.0 as f32, frame_size.1 as f32);

        let region = match region {
            Some(region) if region.is_degenerate() => {
                log::debug!("degenerate head region {region:?}, using no-face overlay");
                None
            }
            other => other,
        };

        let overlay = match region {
            Some(region) => Overlay {
                mode: OverlayMode::Face(region.strategy),
                strokes: self.face_strokes(&region, width, height, rng),
            },
            None => Overlay {
                mode: OverlayMode::NoFace,
                strokes: self.no_face_strokes(width, height, rng),
            },
        };

        log::debug!(
            "overlay {:?} with {} strokes",
            overlay.mode,
            overlay.strokes.len()
        );
        overlay
    }

    fn face_strokes<R: Rng + ?Sized>(
        &self,
        region: &HeadRegion,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Vec<LineStroke> {
        if width <= 0.0 || height <= 0.0 {
            return vec![];
        }

        let config = &self.config;
        let count = stroke_count(rng, config.face_min_strokes, config.face_max_strokes);
        let spread = region.width() * config.anchor_spread;

        (0..count)
            .map(|_| {
                let x = (region.center_x() + symmetric(rng, spread)).clamp(0.0, width);

                let (start_y, end_y) = match region.strategy {
                    HeadStrategy::OutlineBrow => (
                        region.top_y - upto(rng, config.brow_start_jitter),
                        region.bottom_bound_y - upto(rng, config.brow_end_jitter),
                    ),
                    HeadStrategy::JawOnly => (
                        region.top_y - upto(rng, config.jaw_start_jitter),
                        region.top_y + upto(rng, config.jaw_end_jitter),
                    ),
                };
                let (start_y, end_y) = self.vertical_span(start_y, end_y, height);

                let span = end_y - start_y;
                let control = |rng: &mut R, share: f32| {
                    StrokePoint::new(
                        (x + symmetric(rng, config.control_jitter)).clamp(0.0, width),
                        start_y + span * share,
                    )
                };
                let control1 = control(rng, 0.25);
                let control2 = control(rng, 0.75);

                LineStroke::curved(
                    StrokePoint::new(x, start_y),
                    control1,
                    control2,
                    StrokePoint::new(x, end_y),
                )
            })
            .collect()
    }

    fn no_face_strokes<R: Rng + ?Sized>(&self, width: f32, height: f32, rng: &mut R) -> Vec<LineStroke> {
        if width <= 0.0 || height <= 0.0 {
            return vec![];
        }

        let config = &self.config;
        let count = stroke_count(rng, config.no_face_min_strokes, config.no_face_max_strokes);
        let (start_y, end_y) = self.vertical_span(
            height * config.no_face_top,
            height * config.no_face_bottom,
            height,
        );

        (0..count)
            .map(|_| {
                let x = (width * between(rng, config.no_face_left, config.no_face_right))
                    .clamp(0.0, width);
                LineStroke::straight(StrokePoint::new(x, start_y), StrokePoint::new(x, end_y))
            })
            .collect()
    }

    /// Orders, clamps to the frame and stretches to the minimum length.
    fn vertical_span(&self, start_y: f32, end_y: f32, height: f32) -> (f32, f32) {
        let min_length = self.config.min_stroke_length.max(1.0).min(height);
        let start_y = start_y.clamp(0.0, height);
        let end_y = end_y.clamp(0.0, height).max(start_y);

        if end_y - start_y >= min_length {
            return (start_y, end_y);
        }

        // Grow downward, then upward once the bottom edge is hit.
        let end_y = (start_y + min_length).min(height);
        (end_y - min_length, end_y)
    }
}

fn stroke_count<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    rng.random_range(min..=max.max(min))
}

/// Uniform in `[0, max]`; zero for a non-positive or non-finite bound.
fn upto<R: Rng + ?Sized>(rng: &mut R, max: f32) -> f32 {
    if max > 0.0 && max.is_finite() {
        rng.random_range(0.0..=max)
    } else {
        0.0
    }
}

/// Uniform in `[-half, half]`.
fn symmetric<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
    if half > 0.0 && half.is_finite() {
        rng.random_range(-half..=half)
    } else {
        0.0
    }
}

fn between<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low && low.is_finite() && high.is_finite() {
        rng.random_range(low..=high)
    } else {
        low
    }
}
