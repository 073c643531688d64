//! Push-up repetition counting and form feedback from per-frame body keypoints.
//!
//! An external pose model supplies 2D keypoints for every video frame. This
//! library turns that stream into a repetition count and a live form label:
//!
//! 1. A keypoint source maps the detector's index layout onto fixed body slots
//! 2. Joint angles are measured at the elbow, hip and shoulder, and for the neck
//! 3. Each angle is smoothed by its own short moving window
//! 4. Priority-ordered form rules produce a single label
//! 5. A hysteresis state machine counts repetitions with good form
//!
//! # Examples
//!
//! ## Counting from keypoints
//!
//! ```
//! use pose_rep_counter::keypoint::{BodyKeypoints, Keypoint};
//! use pose_rep_counter::session::Session;
//!
//! fn plank(wrist: (f64, f64)) -> BodyKeypoints {
//!     BodyKeypoints {
//!         head: Keypoint::new(200.0, 200.0),
//!         left_shoulder: Keypoint::new(300.0, 200.0),
//!         left_elbow: Keypoint::new(334.2, 294.0),
//!         left_wrist: Keypoint::new(wrist.0, wrist.1),
//!         left_hip: Keypoint::new(500.0, 200.0),
//!         left_knee: Keypoint::new(650.0, 200.0),
//!         right_shoulder: None,
//!     }
//! }
//!
//! let mut session = Session::default();
//! let status = session.status_handle();
//!
//! let analysis = session.process(Some(&plank((350.0, 390.0))));
//! println!("reps={} state={} form={}", analysis.status.rep_count, analysis.status.phase, analysis.status.form_label);
//!
//! // Frames without a person leave the state untouched
//! session.process(None);
//! assert_eq!(status.snapshot(), analysis.status);
//! ```
//!
//! ## Raw detector output
//!
//! ```
//! use pose_rep_counter::config::Config;
//! use pose_rep_counter::session::Session;
//! use pose_rep_counter::source::{RawDetection, RawKeypoint};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let source = config.create_source()?;
//! let mut session = Session::start(&config)?;
//!
//! // A BlazePose frame carries 33 normalized landmarks
//! let detection = RawDetection {
//!     width: 640,
//!     height: 480,
//!     keypoints: vec![RawKeypoint::new(0.5, 0.5, Some(0.9)); 33],
//! };
//!
//! // All points coincide, so no angle can be measured and nothing changes
//! let analysis = session.process_detection(source.as_ref(), Some(&detection));
//! assert_eq!(analysis.status.rep_count, 0);
//! # Ok(())
//! # }
//! ```

/// Semantic keypoint types
pub mod keypoint;

/// Joint angle and distance calculations
pub mod geometry;

/// Angle smoothing filters
pub mod filters;

/// Priority-ordered form rules
pub mod form;

/// Hysteresis repetition counter
pub mod counter;

/// Detector output adapters
pub mod source;

/// Per-frame orchestration and shared status
pub mod session;

/// Error types and result handling
pub mod error;

/// Replay application
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
