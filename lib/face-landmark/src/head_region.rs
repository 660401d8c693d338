use crate::{BoundingBox, FaceDetection, LandmarkGroup, Point};
use derivative::Derivative;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Which landmarks the region was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadStrategy {
    /// Eyebrows plus a face outline.
    OutlineBrow,
    /// Jaw outline and bounding box only.
    JawOnly,
}

/// Approximate head/forehead rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadRegion {
    pub top_y: f32,
    /// Eyebrow line for [`HeadStrategy::OutlineBrow`], lowest jaw point otherwise.
    pub bottom_bound_y: f32,
    pub left_x: f32,
    pub right_x: f32,
    pub strategy: HeadStrategy,
}

impl HeadRegion {
    pub fn width(&self) -> f32 {
        self.right_x - self.left_x
    }

    pub fn center_x(&self) -> f32 {
        self.left_x + self.width() * 0.5
    }

    /// Zero or negative width, or any non-finite edge.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.top_y, self.bottom_bound_y, self.left_x, self.right_x]
            .iter()
            .all(|v| v.is_finite());

        !finite || self.width() <= 0.0
    }

    fn clipped(self, frame_width: u32, frame_height: u32) -> Self {
        let (max_x, max_y) = (frame_width as f32, frame_height as f32);

        Self {
            top_y: self.top_y.clamp(0.0, max_y),
            bottom_bound_y: self.bottom_bound_y.clamp(0.0, max_y),
            left_x: self.left_x.clamp(0.0, max_x),
            right_x: self.right_x.clamp(0.0, max_x),
            strategy: self.strategy,
        }
    }
}

/// Heuristic multipliers; none of them is more than a reasonable guess.
#[derive(Debug, Clone, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default)]
#[non_exhaustive]
pub struct HeadRegionConfig {
    /// Forehead height as a share of the gap between box top and eyebrows.
    #[derivative(Default(value = "0.8"))]
    pub forehead_ratio: f32,

    /// How far above the box the head top sits, as a share of box height.
    #[derivative(Default(value = "0.3"))]
    pub jaw_head_ratio: f32,
}

impl HeadRegionConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadRegionEstimator {
    config: HeadRegionConfig,
}

impl HeadRegionEstimator {
    pub fn new(config: HeadRegionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeadRegionConfig {
        &self.config
    }

    /// `None` when no usable landmark group is present.
    pub fn estimate(&self, detection: &FaceDetection, frame_size: (u32, u32)) -> Option<HeadRegion> {
        let landmarks = detection.landmarks();
        let bbox = detection.bounding_box();

        let outline = landmarks
            .group(LandmarkGroup::FaceOutline)
            .or_else(|| landmarks.group(LandmarkGroup::JawOutline));
        let brows = landmarks
            .group(LandmarkGroup::LeftEyebrow)
            .zip(landmarks.group(LandmarkGroup::RightEyebrow));

        let region = match (brows, outline) {
            (Some((left, right)), Some(outline)) => self.outline_brow(bbox, left, right, outline),
            _ => self.jaw_only(bbox, landmarks.group(LandmarkGroup::JawOutline)?),
        }?;

        let region = region.clipped(frame_size.0, frame_size.1);
        log::debug!("head region: {region:?}");

        Some(region)
    }

    fn outline_brow(
        &self,
        bbox: &BoundingBox,
        left_brow: &[Point],
        right_brow: &[Point],
        outline: &[Point],
    ) -> Option<HeadRegion> {
        if outline.is_empty() {
            return None;
        }

        let top_of_brows = min_y(left_brow.iter().chain(right_brow))?;
        let forehead = (top_of_brows - bbox.y) * self.config.forehead_ratio;
        let top_y = (top_of_brows - forehead).min(top_of_brows).max(0.0);

        let mid = outline.len() / 2;
        let left_x = outline[..=mid].iter().map(|p| p.x).reduce(f32::min)?;
        let right_x = outline[mid..].iter().map(|p| p.x).reduce(f32::max)?;

        Some(HeadRegion {
            top_y,
            bottom_bound_y: top_of_brows,
            left_x: left_x.max(0.0),
            right_x: right_x.max(0.0),
            strategy: HeadStrategy::OutlineBrow,
        })
    }

    fn jaw_only(&self, bbox: &BoundingBox, jaw: &[Point]) -> Option<HeadRegion> {
        let top_y = (bbox.y - bbox.height * self.config.jaw_head_ratio).max(0.0);
        let bottom_bound_y = jaw.iter().map(|p| p.y).reduce(f32::max)?;

        Some(HeadRegion {
            top_y,
            bottom_bound_y: bottom_bound_y.max(0.0),
            left_x: bbox.x.max(0.0),
            right_x: bbox.right().max(0.0),
            strategy: HeadStrategy::JawOnly,
        })
    }
}

fn min_y<'a>(points: impl Iterator<Item = &'a Point>) -> Option<f32> {
    points.map(|p| p.y).reduce(f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LandmarkSet;

    const FRAME: (u32, u32) = (640, 480);

    fn jaw(y_top: f32) -> Vec<Point> {
        (0..17)
            .map(|i| {
                let t = i as f32 / 16.0;
                let x = 210.0 + 180.0 * t;
                let y = y_top + 130.0 * (1.0 - (2.0 * t - 1.0).powi(2));
                Point::new(x, y)
            })
            .collect()
    }

    fn brow(x0: f32, y: f32) -> Vec<Point> {
        (0..5).map(|i| Point::new(x0 + 12.0 * i as f32, y + (i % 2) as f32)).collect()
    }

    fn scenario_a() -> FaceDetection {
        let landmarks = LandmarkSet::new()
            .with_group(LandmarkGroup::JawOutline, jaw(220.0))
            .with_group(LandmarkGroup::RightEyebrow, brow(240.0, 180.0))
            .with_group(LandmarkGroup::LeftEyebrow, brow(320.0, 180.0));
        FaceDetection::new(BoundingBox::new(200.0, 100.0, 200.0, 250.0), landmarks).unwrap()
    }

    #[test]
    fn test_outline_brow_strategy() {
        let region = HeadRegionEstimator::default()
            .estimate(&scenario_a(), FRAME)
            .unwrap();

        assert_eq!(region.strategy, HeadStrategy::OutlineBrow);
        // top_of_brows = 180, forehead = (180 - 100) * 0.8 = 64
        assert!((region.top_y - 116.0).abs() < 1e-3);
        assert!(region.top_y >= 0.0 && region.top_y <= 180.0);
        assert_eq!(region.bottom_bound_y, 180.0);
        assert_eq!(region.left_x, 210.0);
        assert_eq!(region.right_x, 390.0);
        assert!((region.width() - 180.0).abs() < 1e-3);
        assert!(!region.is_degenerate());
    }

    #[test]
    fn test_outline_brow_prefers_face_outline() {
        let outline = vec![
            Point::new(150.0, 200.0),
            Point::new(300.0, 400.0),
            Point::new(450.0, 200.0),
        ];
        let landmarks = scenario_a()
            .landmarks()
            .clone()
            .with_group(LandmarkGroup::FaceOutline, outline);
        let detection =
            FaceDetection::new(BoundingBox::new(200.0, 100.0, 200.0, 250.0), landmarks).unwrap();

        let region = HeadRegionEstimator::default().estimate(&detection, FRAME).unwrap();
        assert_eq!(region.left_x, 150.0);
        assert_eq!(region.right_x, 450.0);
    }

    #[test]
    fn test_jaw_only_strategy() {
        let landmarks = LandmarkSet::new().with_group(LandmarkGroup::JawOutline, jaw(220.0));
        let detection =
            FaceDetection::new(BoundingBox::new(200.0, 100.0, 200.0, 250.0), landmarks).unwrap();

        let region = HeadRegionEstimator::default().estimate(&detection, FRAME).unwrap();
        assert_eq!(region.strategy, HeadStrategy::JawOnly);
        assert!((region.top_y - 25.0).abs() < 1e-3);
        assert_eq!(region.bottom_bound_y, 350.0);
        assert_eq!(region.left_x, 200.0);
        assert_eq!(region.right_x, 400.0);
    }

    #[test]
    fn test_jaw_only_top_never_below_box_or_zero() {
        let estimator = HeadRegionEstimator::default();

        for (y, height) in [(0.0, 100.0), (10.0, 400.0), (100.0, 0.0), (300.0, 180.0), (470.0, 10.0)] {
            let landmarks = LandmarkSet::new().with_group(LandmarkGroup::JawOutline, jaw(y));
            let bbox = BoundingBox::new(100.0, y, 150.0, height).clipped(FRAME.0, FRAME.1);
            let detection = FaceDetection::new(bbox, landmarks).unwrap();

            let region = estimator.estimate(&detection, FRAME).unwrap();
            assert!(region.top_y >= 0.0);
            assert!(region.top_y <= bbox.y, "top {} above box {}", region.top_y, bbox.y);
        }
    }

    #[test]
    fn test_brows_without_outline_or_jaw_is_absent() {
        let landmarks = LandmarkSet::new()
            .with_group(LandmarkGroup::LeftEyebrow, brow(320.0, 180.0))
            .with_group(LandmarkGroup::RightEyebrow, brow(240.0, 180.0));
        let detection =
            FaceDetection::new(BoundingBox::new(200.0, 100.0, 200.0, 250.0), landmarks).unwrap();

        assert!(HeadRegionEstimator::default().estimate(&detection, FRAME).is_none());
    }

    #[test]
    fn test_nose_only_is_absent() {
        let landmarks =
            LandmarkSet::new().with_group(LandmarkGroup::Nose, vec![Point::new(300.0, 250.0)]);
        let detection =
            FaceDetection::new(BoundingBox::new(200.0, 100.0, 200.0, 250.0), landmarks).unwrap();

        assert!(HeadRegionEstimator::default().estimate(&detection, FRAME).is_none());
    }

    #[test]
    fn test_outline_brow_with_empty_outline_is_absent() {
        let estimator = HeadRegionEstimator::default();
        let bbox = BoundingBox::new(200.0, 100.0, 200.0, 250.0);
        let brow = brow(240.0, 180.0);

        assert!(estimator.outline_brow(&bbox, &brow, &brow, &[]).is_none());
        assert!(estimator.outline_brow(&bbox, &brow, &brow, &jaw(220.0)).is_some());
    }

    #[test]
    fn test_custom_ratios() {
        let estimator = HeadRegionEstimator::new(
            HeadRegionConfig::new()
                .with_forehead_ratio(0.5)
                .with_jaw_head_ratio(0.1),
        );

        let region = estimator.estimate(&scenario_a(), FRAME).unwrap();
        assert!((region.top_y - 140.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_width_region_is_degenerate() {
        let landmarks = LandmarkSet::new().with_group(LandmarkGroup::JawOutline, jaw(220.0));
        let detection =
            FaceDetection::new(BoundingBox::new(200.0, 100.0, 0.0, 250.0), landmarks).unwrap();

        let region = HeadRegionEstimator::default().estimate(&detection, FRAME).unwrap();
        assert!(region.is_degenerate());
    }
}
