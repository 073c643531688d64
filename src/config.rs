//! Configuration management for the repetition counter

use crate::counter::CounterThresholds;
use crate::filters::FilterSpec;
use crate::form::{FormRule, FormThresholds};
use crate::geometry::AnglePolicies;
use crate::source::{create_source, CoordinateSpace, HeadReference, KeypointSource, SourceOptions};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detector backend and keypoint mapping
    pub source: SourceConfig,

    /// Angle normalization policy per angle kind
    pub angles: AnglePolicies,

    /// Smoothing filter configuration
    pub smoothing: SmoothingConfig,

    /// Form rule order and thresholds
    pub form: FormConfig,

    /// Repetition counter thresholds
    pub counter: CounterThresholds,
}

/// Keypoint source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Backend name (`blazepose` or `coco`)
    pub detector: String,

    /// Override the backend's native coordinate space
    pub coordinate_space: Option<CoordinateSpace>,

    /// Head reference point for the neck angle
    pub head_reference: HeadReference,

    /// Minimum confidence for required keypoints (0.0-1.0)
    pub min_confidence: f32,
}

/// Smoothing filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Filter type (`moving_average`, `median`, `exponential`, `none`)
    pub filter: String,

    /// Window size for moving average and median filters
    pub window: usize,

    /// Exponential filter alpha value
    pub exponential_alpha: f64,
}

/// Form evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Rules in priority order, highest first
    pub rules: Vec<FormRule>,

    /// Rule thresholds
    pub thresholds: FormThresholds,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let options = SourceOptions::default();
        Self {
            detector: "blazepose".to_string(),
            coordinate_space: options.coordinate_space,
            head_reference: options.head_reference,
            min_confidence: options.min_confidence,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            filter: "moving_average".to_string(),
            window: crate::constants::DEFAULT_SMOOTHING_WINDOW,
            exponential_alpha: crate::constants::DEFAULT_EXPONENTIAL_ALPHA,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            rules: FormRule::DEFAULT_ORDER.to_vec(),
            thresholds: FormThresholds::default(),
        }
    }
}

impl SourceConfig {
    /// Adapter options
    #[must_use]
    pub fn options(&self) -> SourceOptions {
        SourceOptions {
            coordinate_space: self.coordinate_space,
            head_reference: self.head_reference,
            min_confidence: self.min_confidence,
        }
    }
}

impl SmoothingConfig {
    /// Resolve the filter description.
    ///
    /// Plain names take their parameter from `window`/`exponential_alpha`; a
    /// full spec such as `median:7` is used as written.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown filters or invalid parameters.
    pub fn filter_spec(&self) -> Result<FilterSpec> {
        let spec = match self.filter.trim().to_lowercase().as_str() {
            "moving_average" | "movingaverage" => FilterSpec::MovingAverage { window: self.window },
            "median" => FilterSpec::Median { window: self.window },
            "exponential" => FilterSpec::Exponential {
                alpha: self.exponential_alpha,
            },
            other => FilterSpec::parse(other)?,
        };
        spec.validate()?;
        Ok(spec)
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the text is not valid configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the configured keypoint source
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown detector name or invalid options.
    pub fn create_source(&self) -> Result<Box<dyn KeypointSource>> {
        create_source(&self.source.detector, self.source.options())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.source.min_confidence) {
            return Err(Error::ConfigError(
                "Minimum keypoint confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !matches!(
            self.source.detector.to_lowercase().as_str(),
            "blazepose" | "mediapipe" | "coco" | "yolo"
        ) {
            return Err(Error::ConfigError(format!(
                "Unknown detector: {}",
                self.source.detector
            )));
        }

        self.smoothing
            .filter_spec()
            .map_err(|e| Error::ConfigError(format!("Invalid smoothing settings: {e}")))?;

        self.counter
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid counter settings: {e}")))?;

        for (i, rule) in self.form.rules.iter().enumerate() {
            if self.form.rules[..i].contains(rule) {
                return Err(Error::ConfigError(format!("Duplicate form rule: {rule:?}")));
            }
        }
        self.form.thresholds.validate()?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Push-up repetition counter configuration

# Keypoint source
source:
  detector: "blazepose"        # blazepose (33 landmarks) or coco (17 keypoints)
  coordinate_space: null       # null = backend default, or normalized / pixels
  head_reference: "nose"       # nose or ear
  min_confidence: 0.0

# Angle normalization (wrapped = [0, 180], unwrapped = [0, 360),
# oriented = wrapped, past 180 when the vertex sags below its endpoints)
angles:
  limb: "wrapped"
  body: "oriented"
  flare: "wrapped"
  neck: "wrapped"

# Smoothing
smoothing:
  filter: "moving_average"
  window: 5
  exponential_alpha: 0.5

# Form rules, highest priority first
form:
  rules:
    - lower_hips
    - hips_sagging
    - tuck_elbows
    - hands_under_shoulders
    - head_too_low
  thresholds:
    hips_low: 160.0
    hips_sag: 200.0
    elbow_flare: 75.0
    neck: 150.0
    wrist_offset_mode: "pixels"
    wrist_offset_px: 70.0
    wrist_offset_torso_ratio: 0.35
    shoulder_level_px: 40.0

# Repetition counter
counter:
  up: 160.0
  down: 100.0
  depth: 100.0
"#;
