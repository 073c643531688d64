//! Semantic body keypoints consumed by the analysis pipeline.
//!
//! Detector backends disagree on index layout and coordinate space, so every
//! frame is mapped onto [`BodyKeypoints`] (pixel space, fixed semantic slots)
//! before any angle is measured. See [`crate::source`] for the adapters.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anatomical landmarks the pipeline reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    /// Nose or ear, depending on the configured head reference
    Head,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    LeftWrist,
    LeftHip,
    LeftKnee,
}

impl BodyPart {
    /// Every part, in overlay drawing order
    pub const ALL: [Self; 7] = [
        Self::Head,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::LeftWrist,
        Self::LeftHip,
        Self::LeftKnee,
    ];

    /// Stable lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::LeftWrist => "left_wrist",
            Self::LeftHip => "left_hip",
            Self::LeftKnee => "left_knee",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single 2D keypoint in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Pixel position, y grows downwards
    pub position: Point2<f64>,
    /// Detector confidence, when the backend reports one
    pub confidence: Option<f32>,
}

impl Keypoint {
    /// Keypoint without a confidence score
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            confidence: None,
        }
    }

    /// Keypoint with a detector confidence score
    #[must_use]
    pub fn with_confidence(x: f64, y: f64, confidence: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            confidence: Some(confidence),
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Both coordinates are finite numbers
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite()
    }

    /// Confidence meets `threshold`; points without a score always pass
    #[must_use]
    pub fn meets_confidence(&self, threshold: f32) -> bool {
        self.confidence.map_or(true, |c| c >= threshold)
    }
}

/// The fixed keypoint set one frame contributes to the analysis
#[derive(Debug, Clone, PartialEq)]
pub struct BodyKeypoints {
    pub head: Keypoint,
    pub left_shoulder: Keypoint,
    pub left_elbow: Keypoint,
    pub left_wrist: Keypoint,
    pub left_hip: Keypoint,
    pub left_knee: Keypoint,
    /// Only needed by the shoulder-level rule
    pub right_shoulder: Option<Keypoint>,
}

impl BodyKeypoints {
    /// Look up a keypoint by semantic slot
    #[must_use]
    pub fn get(&self, part: BodyPart) -> Option<&Keypoint> {
        match part {
            BodyPart::Head => Some(&self.head),
            BodyPart::LeftShoulder => Some(&self.left_shoulder),
            BodyPart::RightShoulder => self.right_shoulder.as_ref(),
            BodyPart::LeftElbow => Some(&self.left_elbow),
            BodyPart::LeftWrist => Some(&self.left_wrist),
            BodyPart::LeftHip => Some(&self.left_hip),
            BodyPart::LeftKnee => Some(&self.left_knee),
        }
    }

    /// Present keypoints paired with their slot
    pub fn iter(&self) -> impl Iterator<Item = (BodyPart, &Keypoint)> + '_ {
        BodyPart::ALL
            .into_iter()
            .filter_map(move |part| self.get(part).map(|kp| (part, kp)))
    }
}
