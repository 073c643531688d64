//! Two-state hysteresis repetition counter.
//!
//! The counter watches the smoothed limb angle. Crossing above the up
//! threshold after a down phase completes a repetition. It only counts when
//! the down phase went deep enough and the form label at that instant is
//! good. Between the two thresholds nothing changes, so jitter around either
//! boundary cannot double count.

use crate::constants::{DEFAULT_DEPTH_THRESHOLD, DEFAULT_DOWN_THRESHOLD, DEFAULT_UP_THRESHOLD, MIN_DOWN_ANGLE_RESET};
use crate::form::FormLabel;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Movement phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Limb extended
    #[default]
    Up,
    /// Limb flexed
    Down,
}

impl Phase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Angle thresholds in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterThresholds {
    /// Above this the phase becomes `Up`
    pub up: f64,
    /// Below this the phase becomes `Down`
    pub down: f64,
    /// The deepest angle of a down phase must be at or below this to count
    pub depth: f64,
}

impl Default for CounterThresholds {
    fn default() -> Self {
        Self {
            up: DEFAULT_UP_THRESHOLD,
            down: DEFAULT_DOWN_THRESHOLD,
            depth: DEFAULT_DEPTH_THRESHOLD,
        }
    }
}

impl CounterThresholds {
    /// Validate threshold ordering
    ///
    /// # Errors
    ///
    /// Returns [`Error::CounterError`] when a threshold is not finite or the
    /// down threshold lies above the up threshold.
    pub fn validate(&self) -> Result<()> {
        if !(self.up.is_finite() && self.down.is_finite() && self.depth.is_finite()) {
            return Err(Error::CounterError("Thresholds must be finite".to_string()));
        }
        if self.down > self.up {
            return Err(Error::CounterError(format!(
                "Down threshold {} must not exceed up threshold {}",
                self.down, self.up
            )));
        }
        Ok(())
    }
}

/// Why a completed down phase did not count
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// The deepest angle reached stayed above the depth threshold
    InsufficientDepth { deepest: f64 },
    /// Form was not good at the completion edge
    BadForm(FormLabel),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientDepth { deepest } => write!(f, "insufficient depth (deepest {deepest:.1}°)"),
            Self::BadForm(label) => write!(f, "bad form ({label})"),
        }
    }
}

/// What a single step did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CounterEvent {
    /// No phase change
    #[default]
    Idle,
    /// Up → Down transition
    EnteredDown,
    /// Down → Up completed and counted
    RepCounted { count: u32 },
    /// Down → Up completed but rejected
    RepRejected(RejectReason),
}

/// Repetition counter state machine
#[derive(Debug, Clone, PartialEq)]
pub struct RepCounter {
    thresholds: CounterThresholds,
    phase: Phase,
    min_down_angle: f64,
    rep_count: u32,
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::from_valid(CounterThresholds::default())
    }
}

impl RepCounter {
    /// Create a counter in the initial `Up` state
    ///
    /// # Errors
    ///
    /// Returns an error if the thresholds are inconsistent.
    pub fn new(thresholds: CounterThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self::from_valid(thresholds))
    }

    fn from_valid(thresholds: CounterThresholds) -> Self {
        Self {
            thresholds,
            phase: Phase::Up,
            min_down_angle: MIN_DOWN_ANGLE_RESET,
            rep_count: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    /// Deepest angle seen in the current down phase, 180 outside one
    #[must_use]
    pub fn min_down_angle(&self) -> f64 {
        self.min_down_angle
    }

    #[must_use]
    pub fn thresholds(&self) -> &CounterThresholds {
        &self.thresholds
    }

    /// Advance with one smoothed limb angle and the current frame's form label
    pub fn step(&mut self, limb_angle: f64, form: FormLabel) -> CounterEvent {
        if limb_angle > self.thresholds.up {
            let previous = std::mem::replace(&mut self.phase, Phase::Up);
            if previous != Phase::Down {
                return CounterEvent::Idle;
            }

            let deepest = std::mem::replace(&mut self.min_down_angle, MIN_DOWN_ANGLE_RESET);
            return if deepest > self.thresholds.depth {
                CounterEvent::RepRejected(RejectReason::InsufficientDepth { deepest })
            } else if !form.is_good() {
                CounterEvent::RepRejected(RejectReason::BadForm(form))
            } else {
                self.rep_count = self.rep_count.saturating_add(1);
                CounterEvent::RepCounted { count: self.rep_count }
            };
        }

        if limb_angle < self.thresholds.down {
            let previous = std::mem::replace(&mut self.phase, Phase::Down);
            self.min_down_angle = self.min_down_angle.min(limb_angle);
            if previous == Phase::Up {
                return CounterEvent::EnteredDown;
            }
        }

        CounterEvent::Idle
    }
}
