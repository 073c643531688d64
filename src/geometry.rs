//! Joint angle and distance calculations on pixel-space keypoints.

use crate::constants::{DEGENERATE_EPSILON, FULL_TURN_DEGREES, HALF_TURN_DEGREES};
use crate::keypoint::{BodyKeypoints, Keypoint};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a raw angle magnitude above 180° is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnglePolicy {
    /// Fold into `[0, 180]` by reporting `360 - magnitude`
    Wrapped,
    /// Report the raw magnitude in `[0, 360)`
    Unwrapped,
    /// Fold, then report `360 - angle` when the vertex sags below the chord
    /// between the endpoints (image y grows downward). Independent of which
    /// way the body faces and continuous through 180°.
    Oriented,
}

/// The angles tracked per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleKind {
    /// Shoulder-elbow-wrist, drives the Up/Down phase
    Limb,
    /// Shoulder-hip-knee
    Body,
    /// Hip-shoulder-elbow
    Flare,
    /// Head-shoulder-hip
    Neck,
}

impl AngleKind {
    pub const ALL: [Self; 4] = [Self::Limb, Self::Body, Self::Flare, Self::Neck];

    /// Dense index, stable across the crate
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Limb => 0,
            Self::Body => 1,
            Self::Flare => 2,
            Self::Neck => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Limb => "limb",
            Self::Body => "body",
            Self::Flare => "flare",
            Self::Neck => "neck",
        }
    }

    /// Endpoints and vertex `(a, b, c)`; the angle is measured at `b`
    #[must_use]
    pub fn vertices(self, body: &BodyKeypoints) -> (&Keypoint, &Keypoint, &Keypoint) {
        match self {
            Self::Limb => (&body.left_shoulder, &body.left_elbow, &body.left_wrist),
            Self::Body => (&body.left_shoulder, &body.left_hip, &body.left_knee),
            Self::Flare => (&body.left_hip, &body.left_shoulder, &body.left_elbow),
            Self::Neck => (&body.head, &body.left_shoulder, &body.left_hip),
        }
    }

    /// Measure this angle on `body` under `policy`.
    ///
    /// The limb angle is always folded into `[0, 180]` after the policy is
    /// applied. Returns `None` for degenerate vertices.
    #[must_use]
    pub fn measure(self, body: &BodyKeypoints, policy: AnglePolicy) -> Option<f64> {
        let (a, b, c) = self.vertices(body);
        let angle = joint_angle(&a.position, &b.position, &c.position, policy)?;
        Some(match self {
            Self::Limb => fold_to_half_turn(angle),
            _ => angle,
        })
    }
}

impl fmt::Display for AngleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalization policy per angle kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnglePolicies {
    pub limb: AnglePolicy,
    pub body: AnglePolicy,
    pub flare: AnglePolicy,
    pub neck: AnglePolicy,
}

impl Default for AnglePolicies {
    fn default() -> Self {
        Self {
            limb: AnglePolicy::Wrapped,
            body: AnglePolicy::Oriented,
            flare: AnglePolicy::Wrapped,
            neck: AnglePolicy::Wrapped,
        }
    }
}

impl AnglePolicies {
    /// Same policy for every kind
    #[must_use]
    pub fn uniform(policy: AnglePolicy) -> Self {
        Self {
            limb: policy,
            body: policy,
            flare: policy,
            neck: policy,
        }
    }

    #[must_use]
    pub fn for_kind(&self, kind: AngleKind) -> AnglePolicy {
        match kind {
            AngleKind::Limb => self.limb,
            AngleKind::Body => self.body,
            AngleKind::Flare => self.flare,
            AngleKind::Neck => self.neck,
        }
    }
}

/// Map a magnitude above 180° onto its complement
#[must_use]
pub fn fold_to_half_turn(degrees: f64) -> f64 {
    if degrees > HALF_TURN_DEGREES {
        FULL_TURN_DEGREES - degrees
    } else {
        degrees
    }
}

/// Unsigned angular difference at `b` between rays `b→a` and `b→c`, in `[0, 360)`.
///
/// Returns `None` when `b` coincides with `a` or `c`, or any coordinate is
/// not finite.
#[must_use]
pub fn raw_angle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Option<f64> {
    let finite = [a, b, c].iter().all(|p| p.x.is_finite() && p.y.is_finite());
    if !finite {
        return None;
    }

    let ba = a - b;
    let bc = c - b;
    if ba.norm() < DEGENERATE_EPSILON || bc.norm() < DEGENERATE_EPSILON {
        return None;
    }

    let radians = bc.y.atan2(bc.x) - ba.y.atan2(ba.x);
    Some(radians.to_degrees().abs())
}

/// Joint angle at `b` under the given normalization policy
#[must_use]
pub fn joint_angle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, policy: AnglePolicy) -> Option<f64> {
    let magnitude = raw_angle(a, b, c)?;
    Some(match policy {
        AnglePolicy::Unwrapped => magnitude,
        AnglePolicy::Wrapped => fold_to_half_turn(magnitude),
        AnglePolicy::Oriented => {
            let folded = fold_to_half_turn(magnitude);
            if sags_below_chord(a, b, c) {
                FULL_TURN_DEGREES - folded
            } else {
                folded
            }
        }
    })
}

/// Whether `b` lies below the line from `a` to `c` in image coordinates.
///
/// A vertical chord has no below side and reports `false`.
#[must_use]
pub fn sags_below_chord(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    let chord = c - a;
    if chord.x.abs() < DEGENERATE_EPSILON {
        return false;
    }
    let cross = chord.x * (b.y - a.y) - chord.y * (b.x - a.x);
    cross * chord.x.signum() > 0.0
}

/// Euclidean distance between two keypoints
#[must_use]
pub fn distance(a: &Keypoint, b: &Keypoint) -> f64 {
    nalgebra::distance(&a.position, &b.position)
}

/// Absolute horizontal offset between two keypoints
#[must_use]
pub fn horizontal_offset(a: &Keypoint, b: &Keypoint) -> f64 {
    (a.position.x - b.position.x).abs()
}

/// Absolute vertical offset between two keypoints
#[must_use]
pub fn vertical_offset(a: &Keypoint, b: &Keypoint) -> f64 {
    (a.position.y - b.position.y).abs()
}
