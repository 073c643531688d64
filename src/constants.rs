//! Constants used throughout the application

/// Number of samples held by each angle smoothing buffer
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Default window for the optional median filter
pub const DEFAULT_MEDIAN_WINDOW: usize = 5;

/// Default exponential filter alpha
pub const DEFAULT_EXPONENTIAL_ALPHA: f64 = 0.5;

/// Smoothed limb angle above which the arm counts as extended
pub const DEFAULT_UP_THRESHOLD: f64 = 160.0;

/// Smoothed limb angle below which the arm counts as flexed
pub const DEFAULT_DOWN_THRESHOLD: f64 = 100.0;

/// Deepest limb angle a down phase must reach to be eligible for counting
pub const DEFAULT_DEPTH_THRESHOLD: f64 = 100.0;

/// Value `min_down_angle` starts at and returns to when a down phase completes
pub const MIN_DOWN_ANGLE_RESET: f64 = 180.0;

/// Form rule thresholds (degrees unless noted)
pub const DEFAULT_HIPS_LOW_THRESHOLD: f64 = 160.0;
pub const DEFAULT_HIPS_SAG_THRESHOLD: f64 = 200.0;
pub const DEFAULT_ELBOW_FLARE_THRESHOLD: f64 = 75.0;
pub const DEFAULT_NECK_THRESHOLD: f64 = 150.0;

/// Wrist-to-shoulder horizontal offset limit in pixels
pub const DEFAULT_WRIST_OFFSET_PX: f64 = 70.0;

/// Wrist-to-shoulder horizontal offset limit as a fraction of torso length
pub const DEFAULT_WRIST_OFFSET_TORSO_RATIO: f64 = 0.35;

/// Vertical shoulder asymmetry limit in pixels
pub const DEFAULT_SHOULDER_LEVEL_PX: f64 = 40.0;

/// Label reported when no form rule fires
pub const GOOD_FORM_LABEL: &str = "Good Form";

/// Two points closer than this (pixels) are treated as coincident
pub const DEGENERATE_EPSILON: f64 = 1e-6;

/// Degrees in a full turn
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Degrees in a half turn
pub const HALF_TURN_DEGREES: f64 = 180.0;
