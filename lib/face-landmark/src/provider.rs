use crate::{FaceDetection, LandmarkResult};
use async_trait::async_trait;
use camera::Frame;
use std::path::Path;

/// The detector boundary: one frame in, at most one face out.
///
/// Implementations may take arbitrarily long; callers bound the wait with a
/// [`DetectionGate`](crate::DetectionGate). Returning `Ok(None)` means the
/// frame was inspected and no face was found.
#[async_trait]
pub trait LandmarkProvider: Send + Sync {
    fn name(&self) -> &str {
        "landmark-provider"
    }

    async fn detect(&self, frame: Frame) -> LandmarkResult<Option<FaceDetection>>;
}

/// Hands back a preloaded detection for every frame.
#[derive(Debug, Clone, Default)]
pub struct FixedLandmarkProvider {
    detection: Option<FaceDetection>,
}

impl FixedLandmarkProvider {
    pub fn new(detection: Option<FaceDetection>) -> Self {
        Self { detection }
    }

    pub fn from_json_str(json: &str) -> LandmarkResult<Self> {
        let detection = serde_json::from_str::<Option<FaceDetection>>(json)?;
        Ok(Self::new(detection))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> LandmarkResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded landmarks from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }
}

#[async_trait]
impl LandmarkProvider for FixedLandmarkProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn detect(&self, _frame: Frame) -> LandmarkResult<Option<FaceDetection>> {
        Ok(self.detection.clone())
    }
}
