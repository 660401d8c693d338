use crate::{LandmarkError, LandmarkResult};
use serde::{Deserialize, Serialize};

/// Number of points in the common 68-point face layout.
pub const LANDMARKS_68: usize = 68;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned face rectangle in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Clip to `[0, frame dimension]` on both axes.
    pub fn clipped(&self, frame_width: u32, frame_height: u32) -> Self {
        let (max_x, max_y) = (frame_width as f32, frame_height as f32);
        let left = self.x.clamp(0.0, max_x);
        let top = self.y.clamp(0.0, max_y);
        let right = self.right().clamp(left, max_x);
        let bottom = self.bottom().clamp(top, max_y);

        Self::new(left, top, right - left, bottom - top)
    }
}

/// Anatomical feature a run of landmark points belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkGroup {
    /// Runs left to right along the jaw.
    JawOutline,
    RightEyebrow,
    LeftEyebrow,
    Nose,
    RightEye,
    LeftEye,
    Mouth,
    /// Full face contour, for providers that produce one.
    FaceOutline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGroup {
    pub group: LandmarkGroup,
    pub points: Vec<Point>,
}

/// Ordered landmark groups. Point order inside a group is anatomical; nothing
/// is implied about order across groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    groups: Vec<PointGroup>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a group. Empty groups are not stored.
    pub fn with_group(mut self, group: LandmarkGroup, points: Vec<Point>) -> Self {
        self.groups.retain(|g| g.group != group);
        if !points.is_empty() {
            self.groups.push(PointGroup { group, points });
        }
        self
    }

    pub fn group(&self, group: LandmarkGroup) -> Option<&[Point]> {
        self.groups
            .iter()
            .find(|g| g.group == group)
            .map(|g| g.points.as_slice())
    }

    pub fn groups(&self) -> impl Iterator<Item = &PointGroup> {
        self.groups.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    fn points(&self) -> impl Iterator<Item = &Point> {
        self.groups.iter().flat_map(|g| g.points.iter())
    }

    /// Split the standard 68-point layout into its anatomical groups.
    pub fn from_68_points(points: &[Point]) -> LandmarkResult<Self> {
        if points.len() != LANDMARKS_68 {
            return Err(LandmarkError::InvalidDetection(format!(
                "expected {LANDMARKS_68} landmark points, got {}",
                points.len()
            )));
        }

        let layout = [
            (LandmarkGroup::JawOutline, 0..17),
            (LandmarkGroup::RightEyebrow, 17..22),
            (LandmarkGroup::LeftEyebrow, 22..27),
            (LandmarkGroup::Nose, 27..36),
            (LandmarkGroup::RightEye, 36..42),
            (LandmarkGroup::LeftEye, 42..48),
            (LandmarkGroup::Mouth, 48..68),
        ];

        Ok(layout.into_iter().fold(Self::new(), |set, (group, range)| {
            set.with_group(group, points[range].to_vec())
        }))
    }
}

/// A face found by the provider: always a box plus at least one non-empty
/// landmark group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FaceDetectionRecord", into = "FaceDetectionRecord")]
pub struct FaceDetection {
    bounding_box: BoundingBox,
    landmarks: LandmarkSet,
}

impl FaceDetection {
    pub fn new(bounding_box: BoundingBox, landmarks: LandmarkSet) -> LandmarkResult<Self> {
        if !bounding_box.is_finite() || bounding_box.width < 0.0 || bounding_box.height < 0.0 {
            return Err(LandmarkError::InvalidDetection(format!(
                "bad bounding box: {bounding_box:?}"
            )));
        }

        if landmarks.is_empty() {
            return Err(LandmarkError::InvalidDetection(
                "no landmark groups".to_string(),
            ));
        }

        if let Some(empty) = landmarks.groups().find(|g| g.points.is_empty()) {
            return Err(LandmarkError::InvalidDetection(format!(
                "empty landmark group {:?}",
                empty.group
            )));
        }

        if !landmarks.points().all(Point::is_finite) {
            return Err(LandmarkError::InvalidDetection(
                "non-finite landmark point".to_string(),
            ));
        }

        Ok(Self {
            bounding_box,
            landmarks,
        })
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    pub fn clipped_to(mut self, frame_width: u32, frame_height: u32) -> Self {
        self.bounding_box = self.bounding_box.clipped(frame_width, frame_height);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FaceDetectionRecord {
    bounding_box: BoundingBox,
    landmarks: LandmarkSet,
}

impl TryFrom<FaceDetectionRecord> for FaceDetection {
    type Error = LandmarkError;

    fn try_from(record: FaceDetectionRecord) -> LandmarkResult<Self> {
        Self::new(record.bounding_box, record.landmarks)
    }
}

impl From<FaceDetection> for FaceDetectionRecord {
    fn from(detection: FaceDetection) -> Self {
        Self {
            bounding_box: detection.bounding_box,
            landmarks: detection.landmarks,
        }
    }
}
