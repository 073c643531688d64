//! Per-frame analysis orchestration.
//!
//! A [`Session`] owns all detector state for one exercise session and runs the
//! pipeline (angles, smoothing, form rules, repetition counter) for each
//! frame. Consumers that poll status from other threads hold a
//! [`StatusHandle`]; the session publishes one complete [`StatusSnapshot`]
//! per analyzed frame, so a reader never sees a phase update without the
//! matching count.

use crate::config::Config;
use crate::counter::{CounterEvent, Phase, RepCounter};
use crate::filters::SmoothingBank;
use crate::form::{FormEvaluator, FormInputs, FormLabel};
use crate::geometry::{distance, horizontal_offset, vertical_offset, AngleKind, AnglePolicies};
use crate::keypoint::{BodyKeypoints, BodyPart, Keypoint};
use crate::source::{KeypointSource, RawDetection};
use crate::Result;
use log::{debug, info, trace};
use nalgebra::Point2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Externally observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(rename = "reps")]
    pub rep_count: u32,
    #[serde(rename = "state")]
    pub phase: Phase,
    #[serde(rename = "form")]
    pub form_label: FormLabel,
}

/// Cloneable read handle on the latest published snapshot
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl StatusHandle {
    /// Latest complete snapshot
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        *self.inner.read()
    }

    fn publish(&self, snapshot: StatusSnapshot) {
        *self.inner.write() = snapshot;
    }

    /// Live handles sharing this status, the session's own included
    #[cfg(test)]
    pub(crate) fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

/// Mutable detector state owned by one session
pub struct SessionState {
    counter: RepCounter,
    smoothing: SmoothingBank,
    form_label: FormLabel,
}

impl SessionState {
    /// Fresh state: count 0, phase Up, empty buffers, good form
    #[must_use]
    pub fn new(counter: RepCounter, smoothing: SmoothingBank) -> Self {
        Self {
            counter,
            smoothing,
            form_label: FormLabel::GoodForm,
        }
    }

    #[must_use]
    pub fn counter(&self) -> &RepCounter {
        &self.counter
    }

    #[must_use]
    pub fn smoothing(&self) -> &SmoothingBank {
        &self.smoothing
    }

    #[must_use]
    pub fn form_label(&self) -> FormLabel {
        self.form_label
    }

    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            rep_count: self.counter.rep_count(),
            phase: self.counter.phase(),
            form_label: self.form_label,
        }
    }
}

/// Raw and smoothed value of one angle for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleReading {
    /// Measured this frame, `None` when the vertices were degenerate
    pub raw: Option<f64>,
    /// Filter output, or the held value when no sample was pushed
    pub smoothed: Option<f64>,
}

/// Angles measured for one frame, indexed by [`AngleKind`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleReadings([AngleReading; 4]);

impl AngleReadings {
    #[must_use]
    pub fn get(&self, kind: AngleKind) -> AngleReading {
        self.0[kind.index()]
    }
}

/// A line between two keypoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point2<f64>,
    pub to: Point2<f64>,
}

/// Presentation-only geometry used for the frame's evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub keypoints: Vec<(BodyPart, Keypoint)>,
    pub segments: Vec<Segment>,
}

impl Overlay {
    const SEGMENTS: [(BodyPart, BodyPart); 4] = [
        (BodyPart::LeftShoulder, BodyPart::LeftElbow),
        (BodyPart::LeftElbow, BodyPart::LeftWrist),
        (BodyPart::LeftShoulder, BodyPart::LeftHip),
        (BodyPart::LeftHip, BodyPart::LeftKnee),
    ];

    fn from_body(body: &BodyKeypoints) -> Self {
        let segments = Self::SEGMENTS
            .iter()
            .filter_map(|&(a, b)| {
                Some(Segment {
                    from: body.get(a)?.position,
                    to: body.get(b)?.position,
                })
            })
            .collect();
        Self {
            keypoints: body.iter().map(|(part, kp)| (part, *kp)).collect(),
            segments,
        }
    }
}

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    /// Status after this frame
    pub status: StatusSnapshot,
    /// What the counter did, `Idle` for skipped frames
    pub event: CounterEvent,
    /// `None` when the frame had no usable detection
    pub angles: Option<AngleReadings>,
    /// `None` when the frame had no usable detection
    pub overlay: Option<Overlay>,
}

impl FrameAnalysis {
    /// A person was detected and analyzed
    #[must_use]
    pub fn detected(&self) -> bool {
        self.angles.is_some()
    }
}

/// One exercise session
pub struct Session {
    state: SessionState,
    evaluator: FormEvaluator,
    policies: AnglePolicies,
    status: StatusHandle,
    frames_processed: u64,
    frames_missed: u64,
}

impl Session {
    /// Start a session from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the smoothing, form or counter settings are invalid.
    pub fn start(config: &Config) -> Result<Self> {
        let smoothing = SmoothingBank::new(config.smoothing.filter_spec()?)?;
        let counter = RepCounter::new(config.counter)?;
        let evaluator = FormEvaluator::new(config.form.rules.clone(), config.form.thresholds)?;
        Ok(Self::with_parts(SessionState::new(counter, smoothing), evaluator, config.angles))
    }

    /// Assemble a session from already-built components
    #[must_use]
    pub fn with_parts(state: SessionState, evaluator: FormEvaluator, policies: AnglePolicies) -> Self {
        info!(
            "Starting session: smoothing={}, rules={:?}",
            state.smoothing.spec(),
            evaluator.rules()
        );
        let status = StatusHandle::default();
        status.publish(state.snapshot());
        Self {
            state,
            evaluator,
            policies,
            status,
            frames_processed: 0,
            frames_missed: 0,
        }
    }

    /// Handle for concurrent status readers
    #[must_use]
    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        self.state.snapshot()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Frames seen, including ones without a detection
    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    #[must_use]
    pub fn frames_missed(&self) -> u64 {
        self.frames_missed
    }

    /// Run raw detector output through `source` and analyze it
    pub fn process_detection<S>(&mut self, source: &S, detection: Option<&RawDetection>) -> FrameAnalysis
    where
        S: KeypointSource + ?Sized,
    {
        let body = detection.and_then(|d| source.extract(d));
        self.process(body.as_ref())
    }

    /// Analyze one frame; `None` means no person was detected.
    ///
    /// A missed frame leaves buffers, counter and form label untouched.
    pub fn process(&mut self, body: Option<&BodyKeypoints>) -> FrameAnalysis {
        self.frames_processed += 1;

        let Some(body) = body else {
            self.frames_missed += 1;
            trace!("Frame {}: no detection, holding state", self.frames_processed);
            return FrameAnalysis {
                status: self.state.snapshot(),
                event: CounterEvent::Idle,
                angles: None,
                overlay: None,
            };
        };

        let mut readings = AngleReadings::default();
        for kind in AngleKind::ALL {
            let raw = kind.measure(body, self.policies.for_kind(kind));
            let smoothed = match raw {
                Some(sample) => Some(self.state.smoothing.push(kind, sample)),
                None => {
                    trace!("Frame {}: degenerate {} angle skipped", self.frames_processed, kind);
                    self.state.smoothing.current(kind)
                }
            };
            readings.0[kind.index()] = AngleReading { raw, smoothed };
        }

        let inputs = FormInputs {
            body_angle: readings.get(AngleKind::Body).smoothed,
            flare_angle: readings.get(AngleKind::Flare).smoothed,
            neck_angle: readings.get(AngleKind::Neck).smoothed,
            wrist_offset: Some(horizontal_offset(&body.left_wrist, &body.left_shoulder)),
            torso_length: Some(distance(&body.left_shoulder, &body.left_hip)),
            shoulder_tilt: body
                .right_shoulder
                .as_ref()
                .map(|right| vertical_offset(&body.left_shoulder, right)),
        };
        let form_label = self.evaluator.evaluate(&inputs);

        let limb = readings.get(AngleKind::Limb);
        let event = match (limb.raw, limb.smoothed) {
            (Some(_), Some(smoothed)) => self.state.counter.step(smoothed, form_label),
            _ => CounterEvent::Idle,
        };
        self.state.form_label = form_label;

        let status = self.state.snapshot();
        self.status.publish(status);

        match event {
            CounterEvent::RepCounted { count } => info!("Repetition {count} counted"),
            CounterEvent::RepRejected(reason) => info!("Repetition not counted: {reason}"),
            CounterEvent::EnteredDown | CounterEvent::Idle => {}
        }
        debug!(
            "Frame {}: limb={:?} body={:?} phase={} form={} reps={}",
            self.frames_processed,
            limb.smoothed,
            inputs.body_angle,
            status.phase,
            status.form_label,
            status.rep_count
        );

        FrameAnalysis {
            status,
            event,
            angles: Some(readings),
            overlay: Some(Overlay::from_body(body)),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_parts(
            SessionState::new(RepCounter::default(), SmoothingBank::default()),
            FormEvaluator::default(),
            AnglePolicies::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plank(elbow: (f64, f64), wrist: (f64, f64)) -> BodyKeypoints {
        BodyKeypoints {
            head: Keypoint::new(200.0, 200.0),
            left_shoulder: Keypoint::new(300.0, 200.0),
            left_elbow: Keypoint::new(elbow.0, elbow.1),
            left_wrist: Keypoint::new(wrist.0, wrist.1),
            left_hip: Keypoint::new(500.0, 200.0),
            left_knee: Keypoint::new(650.0, 200.0),
            right_shoulder: None,
        }
    }

    #[test]
    fn test_fresh_session() {
        let session = Session::default();
        assert_eq!(session.status(), StatusSnapshot::default());
        assert_eq!(session.status_handle().snapshot(), StatusSnapshot::default());
        assert_eq!(session.status().phase, Phase::Up);
        assert_eq!(session.status().form_label, FormLabel::GoodForm);
    }

    #[test]
    fn test_missed_frame_holds_state() {
        let mut session = Session::default();
        let body = plank((334.2, 294.0), (350.0, 390.0));
        session.process(Some(&body));
        let before = session.status();
        let history = session.state().smoothing().history(AngleKind::Limb);

        let analysis = session.process(None);
        assert!(!analysis.detected());
        assert_eq!(analysis.status, before);
        assert_eq!(session.state().smoothing().history(AngleKind::Limb), history);
        assert_eq!(session.frames_missed(), 1);
        assert_eq!(session.frames_processed(), 2);
    }

    #[test]
    fn test_degenerate_limb_skips_push() {
        let mut session = Session::default();
        // Elbow on top of the shoulder
        let body = plank((300.0, 200.0), (350.0, 390.0));
        let analysis = session.process(Some(&body));

        let limb = analysis.angles.unwrap().get(AngleKind::Limb);
        assert_eq!(limb.raw, None);
        assert_eq!(limb.smoothed, None);
        assert!(session.state().smoothing().history(AngleKind::Limb).is_empty());
        assert_eq!(analysis.event, CounterEvent::Idle);
        // Body angle is still measured
        assert_eq!(session.state().smoothing().history(AngleKind::Body).len(), 1);
    }

    #[test]
    fn test_overlay_segments() {
        let mut session = Session::default();
        let analysis = session.process(Some(&plank((334.2, 294.0), (350.0, 390.0))));
        let overlay = analysis.overlay.unwrap();
        assert_eq!(overlay.segments.len(), 4);
        assert_eq!(overlay.keypoints.len(), 6);
        assert_eq!(overlay.segments[0].from, Point2::new(300.0, 200.0));
    }

    #[test]
    fn test_status_json_field_names() {
        let snapshot = StatusSnapshot {
            rep_count: 3,
            phase: Phase::Down,
            form_label: FormLabel::TuckElbows,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"reps":3,"state":"Down","form":"Tuck Elbows"}"#);
    }
}
