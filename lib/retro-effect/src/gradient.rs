use crate::{Color, EffectError, EffectResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

impl ColorStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Color stops ordered by offset, sampled like a canvas gradient: the first
/// and last stops extend past `0.0` and `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStops {
    stops: Vec<ColorStop>,
}

impl GradientStops {
    pub fn new(mut stops: Vec<ColorStop>) -> EffectResult<Self> {
        if stops.is_empty() {
            return Err(EffectError::InvalidParameter(
                "gradient needs at least one color stop".to_string(),
            ));
        }

        if let Some(stop) = stops
            .iter()
            .find(|s| !(0.0..=1.0).contains(&s.offset) || !(0.0..=1.0).contains(&s.color.a))
        {
            return Err(EffectError::InvalidParameter(format!(
                "color stop out of range: {stop:?}"
            )));
        }

        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Ok(Self { stops })
    }

    /// One fully transparent stop; blending it changes nothing.
    pub fn transparent() -> Self {
        Self {
            stops: vec![ColorStop::new(0.0, Color::BLACK.with_alpha(0.0))],
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn sample(&self, t: f32) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };

        let first = self.stops[0];
        if t <= first.offset {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t <= to.offset {
                let span = to.offset - from.offset;
                if span <= f32::EPSILON {
                    return to.color;
                }
                return from.color.lerp(to.color, (t - from.offset) / span);
            }
        }

        self.stops[self.stops.len() - 1].color
    }
}

impl Default for GradientStops {
    fn default() -> Self {
        Self::transparent()
    }
}
