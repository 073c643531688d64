//! Keypoint source adapters.
//!
//! A detector backend hands over one [`RawDetection`] per frame: a flat list
//! of points in its own index layout and coordinate space. A
//! [`KeypointSource`] maps that onto [`BodyKeypoints`] in pixel space, or
//! reports "no detection" when the frame cannot be used. Missing people,
//! truncated point lists, non-finite coordinates and low-confidence required
//! points all count as "no detection".

use crate::keypoint::{BodyKeypoints, Keypoint};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Coordinate space of raw detector output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Fractions of frame width and height in `[0, 1]`
    Normalized,
    /// Pixels
    Pixels,
}

/// Landmark used as the head reference for the neck angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadReference {
    #[default]
    Nose,
    Ear,
}

/// One point as reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawKeypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl RawKeypoint {
    #[must_use]
    pub fn new(x: f64, y: f64, confidence: Option<f32>) -> Self {
        Self { x, y, confidence }
    }
}

/// Detector output for one frame where a person was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Points in the detector's own index layout
    #[serde(default)]
    pub keypoints: Vec<RawKeypoint>,
}

/// Adapter options shared by every backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    /// Overrides the backend's native coordinate space
    pub coordinate_space: Option<CoordinateSpace>,
    /// Nose or ear as the head point
    pub head_reference: HeadReference,
    /// Required points below this confidence drop the frame
    pub min_confidence: f32,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            coordinate_space: None,
            head_reference: HeadReference::Nose,
            min_confidence: 0.0,
        }
    }
}

/// A detector backend's index layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexScheme {
    pub name: &'static str,
    /// Number of points a complete detection carries
    pub point_count: usize,
    pub native_space: CoordinateSpace,
    pub nose: usize,
    pub left_ear: usize,
    pub left_shoulder: usize,
    pub right_shoulder: usize,
    pub left_elbow: usize,
    pub left_wrist: usize,
    pub left_hip: usize,
    pub left_knee: usize,
}

/// MediaPipe / BlazePose 33-landmark layout
pub const BLAZEPOSE_SCHEME: IndexScheme = IndexScheme {
    name: "blazepose",
    point_count: 33,
    native_space: CoordinateSpace::Normalized,
    nose: 0,
    left_ear: 7,
    left_shoulder: 11,
    right_shoulder: 12,
    left_elbow: 13,
    left_wrist: 15,
    left_hip: 23,
    left_knee: 25,
};

/// COCO 17-keypoint layout used by YOLO pose models
pub const COCO_SCHEME: IndexScheme = IndexScheme {
    name: "coco",
    point_count: 17,
    native_space: CoordinateSpace::Pixels,
    nose: 0,
    left_ear: 3,
    left_shoulder: 5,
    right_shoulder: 6,
    left_elbow: 7,
    left_wrist: 9,
    left_hip: 11,
    left_knee: 13,
};

/// Produces semantic keypoints per frame, or none
pub trait KeypointSource: Send + Sync {
    /// Map one frame of detector output, `None` when it is unusable
    fn extract(&self, detection: &RawDetection) -> Option<BodyKeypoints>;

    /// Index layout this source reads
    fn scheme(&self) -> &IndexScheme;

    /// Get source name
    fn name(&self) -> &str {
        self.scheme().name
    }
}

impl IndexScheme {
    /// Map `detection` through this layout
    #[must_use]
    pub fn extract(&self, detection: &RawDetection, options: &SourceOptions) -> Option<BodyKeypoints> {
        if detection.keypoints.len() < self.point_count {
            return None;
        }

        let space = options.coordinate_space.unwrap_or(self.native_space);
        let (scale_x, scale_y) = match space {
            CoordinateSpace::Pixels => (1.0, 1.0),
            CoordinateSpace::Normalized => {
                if detection.width == 0 || detection.height == 0 {
                    return None;
                }
                (f64::from(detection.width), f64::from(detection.height))
            }
        };

        let point = |index: usize| -> Option<Keypoint> {
            let raw = detection.keypoints.get(index)?;
            let keypoint = Keypoint {
                position: nalgebra::Point2::new(raw.x * scale_x, raw.y * scale_y),
                confidence: raw.confidence,
            };
            (keypoint.is_finite() && keypoint.meets_confidence(options.min_confidence)).then_some(keypoint)
        };

        let head_index = match options.head_reference {
            HeadReference::Nose => self.nose,
            HeadReference::Ear => self.left_ear,
        };

        Some(BodyKeypoints {
            head: point(head_index)?,
            left_shoulder: point(self.left_shoulder)?,
            left_elbow: point(self.left_elbow)?,
            left_wrist: point(self.left_wrist)?,
            left_hip: point(self.left_hip)?,
            left_knee: point(self.left_knee)?,
            right_shoulder: point(self.right_shoulder),
        })
    }
}

/// MediaPipe BlazePose backend (33 landmarks, normalized coordinates)
#[derive(Debug, Clone, Default)]
pub struct BlazePoseSource {
    options: SourceOptions,
}

impl BlazePoseSource {
    #[must_use]
    pub fn new(options: SourceOptions) -> Self {
        Self { options }
    }
}

impl KeypointSource for BlazePoseSource {
    fn extract(&self, detection: &RawDetection) -> Option<BodyKeypoints> {
        BLAZEPOSE_SCHEME.extract(detection, &self.options)
    }

    fn scheme(&self) -> &IndexScheme {
        &BLAZEPOSE_SCHEME
    }
}

/// YOLO pose backend (17 COCO keypoints, pixel coordinates)
#[derive(Debug, Clone, Default)]
pub struct CocoSource {
    options: SourceOptions,
}

impl CocoSource {
    #[must_use]
    pub fn new(options: SourceOptions) -> Self {
        Self { options }
    }
}

impl KeypointSource for CocoSource {
    fn extract(&self, detection: &RawDetection) -> Option<BodyKeypoints> {
        COCO_SCHEME.extract(detection, &self.options)
    }

    fn scheme(&self) -> &IndexScheme {
        &COCO_SCHEME
    }
}

/// Create a keypoint source by backend name
///
/// # Errors
///
/// Returns [`Error::SourceError`] for unknown names or a confidence threshold
/// outside `[0, 1]`.
pub fn create_source(name: &str, options: SourceOptions) -> Result<Box<dyn KeypointSource>> {
    if !(0.0..=1.0).contains(&options.min_confidence) {
        return Err(Error::SourceError(format!(
            "Minimum confidence must be between 0.0 and 1.0, got {}",
            options.min_confidence
        )));
    }

    match name.to_lowercase().as_str() {
        "blazepose" | "mediapipe" => Ok(Box::new(BlazePoseSource::new(options))),
        "coco" | "yolo" => Ok(Box::new(CocoSource::new(options))),
        _ => Err(Error::SourceError(format!("Unknown keypoint source: {name}"))),
    }
}
