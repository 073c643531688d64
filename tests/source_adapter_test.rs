//! Keypoint source adapter tests


use pose_rep_counter::session::Session;
use pose_rep_counter::source::{
    create_source, BlazePoseSource, CocoSource, CoordinateSpace, KeypointSource, RawDetection, RawKeypoint,
    SourceOptions, BLAZEPOSE_SCHEME, COCO_SCHEME,
};
use test_helpers::{coco_detection, pushup_pose, ramp_170_90_170};

fn blazepose_frame(width: u32, height: u32) -> RawDetection {
    let keypoints = (0..BLAZEPOSE_SCHEME.point_count)
        .map(|i| RawKeypoint::new(i as f64 / 100.0, i as f64 / 50.0, Some(0.8)))
        .collect();
    RawDetection {
        width,
        height,
        keypoints,
    }
}

#[test]
fn test_normalized_coordinates_scale_to_pixels() {
    let body = BlazePoseSource::default().extract(&blazepose_frame(1000, 500)).unwrap();

    // Landmark 11 at (0.11, 0.22)
    assert!((body.left_shoulder.x() - 110.0).abs() < 1e-9);
    assert!((body.left_shoulder.y() - 110.0).abs() < 1e-9);
    // Landmark 25 at (0.25, 0.50)
    assert!((body.left_knee.x() - 250.0).abs() < 1e-9);
    assert!((body.left_knee.y() - 250.0).abs() < 1e-9);
    assert_eq!(body.left_wrist.confidence, Some(0.8));
}

#[test]
fn test_zero_sized_frame_is_no_detection() {
    assert!(BlazePoseSource::default().extract(&blazepose_frame(0, 480)).is_none());
}

#[test]
fn test_pixel_override() {
    let options = SourceOptions {
        coordinate_space: Some(CoordinateSpace::Pixels),
        ..SourceOptions::default()
    };
    let body = BlazePoseSource::new(options).extract(&blazepose_frame(1000, 500)).unwrap();
    assert!((body.left_shoulder.x() - 0.11).abs() < 1e-12);
}

#[test]
fn test_confidence_gate() {
    let options = SourceOptions {
        min_confidence: 0.5,
        ..SourceOptions::default()
    };
    let source = CocoSource::new(options);
    let mut frame = coco_detection(&pushup_pose(150.0));
    assert!(source.extract(&frame).is_some());

    // Right shoulder is optional
    frame.keypoints[COCO_SCHEME.right_shoulder].confidence = Some(0.1);
    let body = source.extract(&frame).unwrap();
    assert!(body.right_shoulder.is_none());

    // A required point below the threshold drops the frame
    frame.keypoints[COCO_SCHEME.left_elbow].confidence = Some(0.1);
    assert!(source.extract(&frame).is_none());

    // Points without a confidence are accepted
    frame.keypoints[COCO_SCHEME.left_elbow].confidence = None;
    assert!(source.extract(&frame).is_some());
}

#[test]
fn test_non_finite_coordinates_are_no_detection() {
    let source = CocoSource::default();
    let mut frame = coco_detection(&pushup_pose(150.0));
    frame.keypoints[COCO_SCHEME.left_wrist].x = f64::NAN;
    assert!(source.extract(&frame).is_none());

    let mut frame = coco_detection(&pushup_pose(150.0));
    frame.keypoints[COCO_SCHEME.left_hip].y = f64::INFINITY;
    assert!(source.extract(&frame).is_none());
}

#[test]
fn test_empty_detection_is_no_detection() {
    let frame = RawDetection {
        width: 640,
        height: 480,
        keypoints: Vec::new(),
    };
    assert!(CocoSource::default().extract(&frame).is_none());
    assert!(BlazePoseSource::default().extract(&frame).is_none());
}

#[test]
fn test_coco_stream_through_session() {
    let source = create_source("yolo", SourceOptions::default()).unwrap();
    let mut session = Session::default();

    for angle in ramp_170_90_170() {
        let frame = coco_detection(&pushup_pose(angle));
        let analysis = session.process_detection(source.as_ref(), Some(&frame));
        assert!(analysis.detected());
    }
    let analysis = session.process_detection(source.as_ref(), None);
    assert!(!analysis.detected());

    assert_eq!(session.status().rep_count, 1);
    assert_eq!(session.frames_missed(), 1);
}

#[test]
fn test_source_names() {
    assert_eq!(BlazePoseSource::default().name(), "blazepose");
    assert_eq!(CocoSource::default().name(), "coco");
    assert_eq!(CocoSource::default().scheme().point_count, 17);
}
