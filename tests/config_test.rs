//! Configuration loading tests

use pose_rep_counter::config::{Config, EXAMPLE_CONFIG};
use pose_rep_counter::filters::FilterSpec;
use pose_rep_counter::form::{FormRule, WristOffsetMode};
use pose_rep_counter::geometry::{AngleKind, AnglePolicy};
use pose_rep_counter::source::{CoordinateSpace, HeadReference};
use tempfile::tempdir;

#[test]
fn test_config_file_round_trip() {
    let mut config = Config::default();
    config.source.detector = "coco".to_string();
    config.source.head_reference = HeadReference::Ear;
    config.smoothing.filter = "median".to_string();
    config.smoothing.window = 7;
    config.form.rules.push(FormRule::KeepShouldersLevel);
    config.counter.up = 155.0;

    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("round-trip.yaml");
    config.to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.source.detector, "coco");
    assert_eq!(loaded.source.head_reference, HeadReference::Ear);
    assert_eq!(loaded.smoothing.filter_spec().unwrap(), FilterSpec::Median { window: 7 });
    assert_eq!(loaded.form.rules.last(), Some(&FormRule::KeepShouldersLevel));
    assert_eq!(loaded.counter, config.counter);
    assert_eq!(loaded.angles, config.angles);
}

#[test]
fn test_missing_file_is_error() {
    let tmp = tempdir().expect("tempdir");
    assert!(Config::from_file(tmp.path().join("does-not-exist.yaml")).is_err());
}

#[test]
fn test_yaml_overrides() {
    let yaml = r#"
source:
  detector: yolo
  coordinate_space: normalized
  min_confidence: 0.3
angles:
  body: wrapped
form:
  rules: [head_too_low, tuck_elbows]
  thresholds:
    wrist_offset_mode: torso_relative
"#;
    let config = Config::from_yaml(yaml).unwrap();
    config.validate().unwrap();

    assert_eq!(config.source.coordinate_space, Some(CoordinateSpace::Normalized));
    assert_eq!(config.source.min_confidence, 0.3);
    assert_eq!(config.angles.for_kind(AngleKind::Body), AnglePolicy::Wrapped);
    assert_eq!(config.angles.for_kind(AngleKind::Neck), AnglePolicy::Wrapped);
    assert_eq!(config.form.rules, vec![FormRule::HeadTooLow, FormRule::TuckElbows]);
    assert_eq!(config.form.thresholds.wrist_offset_mode, WristOffsetMode::TorsoRelative);
    assert_eq!(config.form.thresholds.neck, 150.0);
    assert_eq!(config.create_source().unwrap().name(), "coco");
}

#[test]
fn test_malformed_yaml_is_error() {
    assert!(Config::from_yaml("counter: [1, 2").is_err());
    assert!(Config::from_yaml("angles:\n  limb: sideways\n").is_err());
}

#[test]
fn test_example_config_is_valid() {
    let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
    config.validate().unwrap();
    assert_eq!(config.angles.for_kind(AngleKind::Body), AnglePolicy::Oriented);
}
