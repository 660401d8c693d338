//! Face landmarks for the photo booth.
//!
//! - [`landmark`]: points, bounding boxes and named landmark groups
//! - [`provider`]: the boundary to whatever detector produces landmarks
//! - [`gate`]: a deadline race around one provider call
//! - [`head_region`]: head/forehead geometry estimated from landmarks

pub mod gate;
pub mod head_region;
pub mod landmark;
pub mod provider;

pub use gate::{DEFAULT_DETECTION_TIMEOUT, DetectionGate, DetectionOutcome};
pub use head_region::{HeadRegion, HeadRegionConfig, HeadRegionEstimator, HeadStrategy};
pub use landmark::{BoundingBox, FaceDetection, LandmarkGroup, LandmarkSet, Point, PointGroup};
pub use provider::{FixedLandmarkProvider, LandmarkProvider};

pub type LandmarkResult<T> = Result<T, LandmarkError>;

#[derive(thiserror::Error, Debug)]
pub enum LandmarkError {
    #[error("Landmark detection failed: {0}")]
    DetectionFailed(String),

    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
