//! Priority-ordered form rules.
//!
//! Each frame the evaluator walks its rule list in order and reports the label
//! of the first rule that fires, or [`FormLabel::GoodForm`] when none do. Only
//! one problem is surfaced at a time; lower-priority violations stay hidden
//! until the higher ones are fixed.

use crate::constants::{
    DEFAULT_ELBOW_FLARE_THRESHOLD, DEFAULT_HIPS_LOW_THRESHOLD, DEFAULT_HIPS_SAG_THRESHOLD, DEFAULT_NECK_THRESHOLD,
    DEFAULT_SHOULDER_LEVEL_PX, DEFAULT_WRIST_OFFSET_PX, DEFAULT_WRIST_OFFSET_TORSO_RATIO, DEGENERATE_EPSILON,
    GOOD_FORM_LABEL,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Form classification surfaced to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FormLabel {
    #[default]
    #[serde(rename = "Good Form")]
    GoodForm,
    #[serde(rename = "Lower Hips")]
    LowerHips,
    #[serde(rename = "Hips Sagging")]
    HipsSagging,
    #[serde(rename = "Tuck Elbows")]
    TuckElbows,
    #[serde(rename = "Hands Under Shoulders")]
    HandsUnderShoulders,
    #[serde(rename = "Head Too Low")]
    HeadTooLow,
    #[serde(rename = "Keep Shoulders Level")]
    KeepShouldersLevel,
}

impl FormLabel {
    /// Human-readable feedback text
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoodForm => GOOD_FORM_LABEL,
            Self::LowerHips => "Lower Hips",
            Self::HipsSagging => "Hips Sagging",
            Self::TuckElbows => "Tuck Elbows",
            Self::HandsUnderShoulders => "Hands Under Shoulders",
            Self::HeadTooLow => "Head Too Low",
            Self::KeepShouldersLevel => "Keep Shoulders Level",
        }
    }

    /// The sentinel that allows a repetition to count
    #[must_use]
    pub fn is_good(self) -> bool {
        self == Self::GoodForm
    }
}

impl fmt::Display for FormLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single form check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormRule {
    /// Body angle below the low threshold
    LowerHips,
    /// Body angle above the sag threshold
    HipsSagging,
    /// Elbow flare angle above threshold
    TuckElbows,
    /// Wrist too far ahead of or behind the shoulder
    HandsUnderShoulders,
    /// Neck angle below threshold
    HeadTooLow,
    /// Vertical asymmetry between the shoulders
    KeepShouldersLevel,
}

impl FormRule {
    /// Default priority order
    pub const DEFAULT_ORDER: [Self; 5] = [
        Self::LowerHips,
        Self::HipsSagging,
        Self::TuckElbows,
        Self::HandsUnderShoulders,
        Self::HeadTooLow,
    ];

    /// Label reported when this rule fires
    #[must_use]
    pub fn label(self) -> FormLabel {
        match self {
            Self::LowerHips => FormLabel::LowerHips,
            Self::HipsSagging => FormLabel::HipsSagging,
            Self::TuckElbows => FormLabel::TuckElbows,
            Self::HandsUnderShoulders => FormLabel::HandsUnderShoulders,
            Self::HeadTooLow => FormLabel::HeadTooLow,
            Self::KeepShouldersLevel => FormLabel::KeepShouldersLevel,
        }
    }
}

/// How the wrist-under-shoulder limit is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WristOffsetMode {
    /// Fixed pixel distance
    Pixels,
    /// Fraction of shoulder-to-hip distance
    TorsoRelative,
}

/// Rule thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormThresholds {
    /// Body angle below this fires `LowerHips`
    pub hips_low: f64,
    /// Body angle above this fires `HipsSagging`
    pub hips_sag: f64,
    /// Flare angle above this fires `TuckElbows`
    pub elbow_flare: f64,
    /// Neck angle below this fires `HeadTooLow`
    pub neck: f64,
    /// Selects which wrist limit applies
    pub wrist_offset_mode: WristOffsetMode,
    /// Wrist limit in pixels
    pub wrist_offset_px: f64,
    /// Wrist limit as a fraction of torso length
    pub wrist_offset_torso_ratio: f64,
    /// Shoulder height difference limit in pixels
    pub shoulder_level_px: f64,
}

impl Default for FormThresholds {
    fn default() -> Self {
        Self {
            hips_low: DEFAULT_HIPS_LOW_THRESHOLD,
            hips_sag: DEFAULT_HIPS_SAG_THRESHOLD,
            elbow_flare: DEFAULT_ELBOW_FLARE_THRESHOLD,
            neck: DEFAULT_NECK_THRESHOLD,
            wrist_offset_mode: WristOffsetMode::Pixels,
            wrist_offset_px: DEFAULT_WRIST_OFFSET_PX,
            wrist_offset_torso_ratio: DEFAULT_WRIST_OFFSET_TORSO_RATIO,
            shoulder_level_px: DEFAULT_SHOULDER_LEVEL_PX,
        }
    }
}

impl FormThresholds {
    /// Check every threshold is a finite number and the distance limits are positive
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let angles = [
            ("hips_low", self.hips_low),
            ("hips_sag", self.hips_sag),
            ("elbow_flare", self.elbow_flare),
            ("neck", self.neck),
        ];
        for (name, value) in angles {
            if !value.is_finite() {
                return Err(Error::ConfigError(format!("Form threshold {name} must be finite")));
            }
        }

        let distances = [
            ("wrist_offset_px", self.wrist_offset_px),
            ("wrist_offset_torso_ratio", self.wrist_offset_torso_ratio),
            ("shoulder_level_px", self.shoulder_level_px),
        ];
        for (name, value) in distances {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::ConfigError(format!("Form threshold {name} must be positive")));
            }
        }

        if self.hips_low > self.hips_sag {
            return Err(Error::ConfigError(
                "hips_low must not exceed hips_sag".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-frame measurements the rules look at.
///
/// A `None` input means it could not be measured this frame, and rules that
/// depend on it do not fire.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormInputs {
    /// Smoothed shoulder-hip-knee angle
    pub body_angle: Option<f64>,
    /// Smoothed hip-shoulder-elbow angle
    pub flare_angle: Option<f64>,
    /// Smoothed head-shoulder-hip angle
    pub neck_angle: Option<f64>,
    /// Horizontal wrist-to-shoulder distance in pixels
    pub wrist_offset: Option<f64>,
    /// Shoulder-to-hip distance in pixels
    pub torso_length: Option<f64>,
    /// Vertical distance between the two shoulders in pixels
    pub shoulder_tilt: Option<f64>,
}

/// Evaluates rules in priority order, first match wins
#[derive(Debug, Clone, PartialEq)]
pub struct FormEvaluator {
    rules: Vec<FormRule>,
    thresholds: FormThresholds,
}

impl Default for FormEvaluator {
    fn default() -> Self {
        Self {
            rules: FormRule::DEFAULT_ORDER.to_vec(),
            thresholds: FormThresholds::default(),
        }
    }
}

impl FormEvaluator {
    /// Create an evaluator with an explicit rule order
    ///
    /// # Errors
    ///
    /// Returns an error if a rule appears twice or a threshold is invalid.
    pub fn new(rules: Vec<FormRule>, thresholds: FormThresholds) -> Result<Self> {
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].contains(rule) {
                return Err(Error::ConfigError(format!("Duplicate form rule: {rule:?}")));
            }
        }
        thresholds.validate()?;
        Ok(Self { rules, thresholds })
    }

    #[must_use]
    pub fn rules(&self) -> &[FormRule] {
        &self.rules
    }

    #[must_use]
    pub fn thresholds(&self) -> &FormThresholds {
        &self.thresholds
    }

    /// Label of the highest-priority rule that fires
    #[must_use]
    pub fn evaluate(&self, inputs: &FormInputs) -> FormLabel {
        self.rules
            .iter()
            .copied()
            .find(|&rule| self.fires(rule, inputs))
            .map_or(FormLabel::GoodForm, FormRule::label)
    }

    /// Whether a single rule fires, regardless of priority
    #[must_use]
    pub fn fires(&self, rule: FormRule, inputs: &FormInputs) -> bool {
        let t = &self.thresholds;
        match rule {
            FormRule::LowerHips => inputs.body_angle.is_some_and(|a| a < t.hips_low),
            FormRule::HipsSagging => inputs.body_angle.is_some_and(|a| a > t.hips_sag),
            FormRule::TuckElbows => inputs.flare_angle.is_some_and(|a| a > t.elbow_flare),
            FormRule::HeadTooLow => inputs.neck_angle.is_some_and(|a| a < t.neck),
            FormRule::KeepShouldersLevel => inputs.shoulder_tilt.is_some_and(|d| d > t.shoulder_level_px),
            FormRule::HandsUnderShoulders => {
                let Some(offset) = inputs.wrist_offset else {
                    return false;
                };
                match t.wrist_offset_mode {
                    WristOffsetMode::Pixels => offset > t.wrist_offset_px,
                    WristOffsetMode::TorsoRelative => inputs
                        .torso_length
                        .filter(|&len| len > DEGENERATE_EPSILON)
                        .is_some_and(|len| offset / len > t.wrist_offset_torso_ratio),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_inputs() -> FormInputs {
        FormInputs {
            body_angle: Some(180.0),
            flare_angle: Some(60.0),
            neck_angle: Some(170.0),
            wrist_offset: Some(20.0),
            torso_length: Some(200.0),
            shoulder_tilt: Some(5.0),
        }
    }

    #[test]
    fn test_good_form_when_nothing_fires() {
        let evaluator = FormEvaluator::default();
        assert_eq!(evaluator.evaluate(&good_inputs()), FormLabel::GoodForm);
        assert_eq!(evaluator.evaluate(&FormInputs::default()), FormLabel::GoodForm);
    }

    #[test]
    fn test_each_rule_fires_alone() {
        let evaluator = FormEvaluator::default();
        let cases = [
            (FormInputs { body_angle: Some(150.0), ..good_inputs() }, FormLabel::LowerHips),
            (FormInputs { body_angle: Some(210.0), ..good_inputs() }, FormLabel::HipsSagging),
            (FormInputs { flare_angle: Some(80.0), ..good_inputs() }, FormLabel::TuckElbows),
            (FormInputs { wrist_offset: Some(71.0), ..good_inputs() }, FormLabel::HandsUnderShoulders),
            (FormInputs { neck_angle: Some(140.0), ..good_inputs() }, FormLabel::HeadTooLow),
        ];
        for (inputs, expected) in cases {
            assert_eq!(evaluator.evaluate(&inputs), expected);
        }
    }

    #[test]
    fn test_first_match_wins() {
        let evaluator = FormEvaluator::default();
        let inputs = FormInputs {
            body_angle: Some(150.0),
            flare_angle: Some(90.0),
            ..good_inputs()
        };
        assert!(evaluator.fires(FormRule::TuckElbows, &inputs));
        assert_eq!(evaluator.evaluate(&inputs), FormLabel::LowerHips);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let evaluator = FormEvaluator::default();
        let inputs = FormInputs {
            body_angle: Some(160.0),
            flare_angle: Some(75.0),
            neck_angle: Some(150.0),
            wrist_offset: Some(70.0),
            ..good_inputs()
        };
        assert_eq!(evaluator.evaluate(&inputs), FormLabel::GoodForm);
    }

    #[test]
    fn test_torso_relative_wrist_offset() {
        let thresholds = FormThresholds {
            wrist_offset_mode: WristOffsetMode::TorsoRelative,
            wrist_offset_torso_ratio: 0.3,
            ..FormThresholds::default()
        };
        let evaluator = FormEvaluator::new(vec![FormRule::HandsUnderShoulders], thresholds).unwrap();

        let near = FormInputs { wrist_offset: Some(50.0), torso_length: Some(200.0), ..FormInputs::default() };
        let far = FormInputs { wrist_offset: Some(80.0), torso_length: Some(200.0), ..FormInputs::default() };
        let no_torso = FormInputs { wrist_offset: Some(80.0), torso_length: Some(0.0), ..FormInputs::default() };

        assert_eq!(evaluator.evaluate(&near), FormLabel::GoodForm);
        assert_eq!(evaluator.evaluate(&far), FormLabel::HandsUnderShoulders);
        assert_eq!(evaluator.evaluate(&no_torso), FormLabel::GoodForm);
    }

    #[test]
    fn test_shoulder_rule_only_when_enabled() {
        let tilted = FormInputs { shoulder_tilt: Some(50.0), ..good_inputs() };
        assert_eq!(FormEvaluator::default().evaluate(&tilted), FormLabel::GoodForm);

        let mut rules = FormRule::DEFAULT_ORDER.to_vec();
        rules.push(FormRule::KeepShouldersLevel);
        let evaluator = FormEvaluator::new(rules, FormThresholds::default()).unwrap();
        assert_eq!(evaluator.evaluate(&tilted), FormLabel::KeepShouldersLevel);
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let rules = vec![FormRule::TuckElbows, FormRule::LowerHips, FormRule::TuckElbows];
        assert!(FormEvaluator::new(rules, FormThresholds::default()).is_err());
    }

    #[test]
    fn test_label_text() {
        assert_eq!(FormLabel::GoodForm.to_string(), "Good Form");
        assert_eq!(FormLabel::HandsUnderShoulders.to_string(), "Hands Under Shoulders");
        assert!(FormLabel::GoodForm.is_good());
        assert!(!FormLabel::HeadTooLow.is_good());
    }
}
