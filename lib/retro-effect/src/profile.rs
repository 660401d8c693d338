use crate::{Color, ColorGradeConfig, ColorStop, EffectResult, VignetteConfig};
use serde::{Deserialize, Serialize};

const PINK: Color = Color::rgba(255, 182, 193, 0.3);
const VIOLET: Color = Color::rgba(147, 112, 219, 0.3);
const MAGENTA: Color = Color::rgba(255, 0, 255, 0.2);

/// Named looks. They differ in gradient and vignette strength; all keep a
/// transparent centre and dark edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetroProfile {
    /// Pink, violet and magenta cast with a soft-then-steep vignette.
    #[default]
    SLine,
    /// Two-stop pink to violet cast with a linear vignette.
    Classic,
}

impl RetroProfile {
    pub fn name(&self) -> &'static str {
        match self {
            RetroProfile::SLine => "S-Line",
            RetroProfile::Classic => "Classic",
        }
    }

    pub fn all_profiles() -> &'static [RetroProfile] {
        &[RetroProfile::SLine, RetroProfile::Classic]
    }

    pub fn color_grade(&self) -> EffectResult<ColorGradeConfig> {
        let stops = match self {
            RetroProfile::SLine => vec![
                ColorStop::new(0.0, PINK),
                ColorStop::new(0.5, VIOLET),
                ColorStop::new(1.0, MAGENTA),
            ],
            RetroProfile::Classic => vec![ColorStop::new(0.0, PINK), ColorStop::new(1.0, VIOLET)],
        };

        ColorGradeConfig::from_stops(stops)
    }

    pub fn vignette(&self) -> EffectResult<VignetteConfig> {
        match self {
            RetroProfile::SLine => {
                VignetteConfig::from_alpha_stops(&[(0.0, 0.0), (0.7, 0.1), (1.0, 0.5)])
            }
            RetroProfile::Classic => VignetteConfig::from_alpha_stops(&[(0.0, 0.0), (1.0, 0.4)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_profile_builds() {
        for profile in RetroProfile::all_profiles() {
            assert!(profile.color_grade().is_ok(), "{}", profile.name());

            let vignette = profile.vignette().unwrap();
            let stops = vignette.stops();
            assert_eq!(stops.sample(0.0).a, 0.0);
            assert!(stops.sample(1.0).a > 0.0);
        }
    }
}
