use crate::overlay::OverlayConfig;
use anyhow::{Context, Result};
use derivative::Derivative;
use face_landmark::HeadRegionConfig;
use retro_effect::{DEFAULT_MAX_SURFACE_PIXELS, RetroProfile};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub detection: Detection,
    pub head_region: HeadRegionConfig,
    pub overlay: OverlayConfig,
    pub effect: Effect,
    pub camera: Camera,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Detection {
    #[derivative(Default(value = "2000"))]
    pub timeout_ms: u64,
}

impl Detection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Effect {
    pub profile: RetroProfile,

    #[derivative(Default(value = "DEFAULT_MAX_SURFACE_PIXELS"))]
    pub max_surface_pixels: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Camera {
    pub index: u32,

    #[derivative(Default(value = "camera::NOMINAL_WIDTH"))]
    pub width: u32,

    #[derivative(Default(value = "camera::NOMINAL_HEIGHT"))]
    pub height: u32,

    #[derivative(Default(value = "true"))]
    pub mirror: bool,
}

impl Config {
    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {} failed", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("parse config {} failed", path.display()))?;

        log::debug!("config loaded from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str::<Config>(text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("save config {} failed", path.display()))?;

        log::info!("config saved to {}", path.display());
        Ok(())
    }
}
