//! Signal filtering algorithms for smoothing per-frame joint angles.
//!
//! Raw angles jitter with the detector. Every tracked [`AngleKind`] gets its
//! own filter instance, held by a [`SmoothingBank`] for the whole session.

/// Moving average filter, the default smoother
pub mod moving_average;

/// Median filter for outlier rejection
pub mod median;

/// Exponential filter for responsive smoothing
pub mod exponential;

use crate::geometry::AngleKind;
use crate::{Error, Result};
use std::fmt;

/// Trait for single-channel angle filters
pub trait AngleFilter: Send + Sync {
    /// Feed one sample and return the smoothed value
    fn apply(&mut self, sample: f64) -> f64;

    /// Smoothed value for the samples held so far, without feeding a new one
    fn current(&self) -> Option<f64>;

    /// Internal history, oldest first
    fn history(&self) -> Vec<f64>;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes samples through unchanged
#[derive(Default)]
pub struct NoFilter {
    last: Option<f64>,
}

impl AngleFilter for NoFilter {
    fn apply(&mut self, sample: f64) -> f64 {
        self.last = Some(sample);
        sample
    }

    fn current(&self) -> Option<f64> {
        self.last
    }

    fn history(&self) -> Vec<f64> {
        self.last.into_iter().collect()
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Validated filter description, parsed from strings such as `"median:5"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterSpec {
    None,
    MovingAverage { window: usize },
    Median { window: usize },
    Exponential { alpha: f64 },
}

impl FilterSpec {
    /// Parse `name[:param]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FilterError`] for unknown names or out-of-range
    /// parameters.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim().to_lowercase();
        let mut parts = spec.split(':');
        let name = parts.next().unwrap_or_default();
        let param = parts.next();
        if parts.next().is_some() {
            return Err(Error::FilterError(format!("Too many parameters in filter spec: {spec}")));
        }

        let parsed = match name {
            "none" | "nofilter" => Self::None,
            "moving_average" | "movingaverage" => Self::MovingAverage {
                window: parse_param(param, crate::constants::DEFAULT_SMOOTHING_WINDOW)?,
            },
            "median" => Self::Median {
                window: parse_param(param, crate::constants::DEFAULT_MEDIAN_WINDOW)?,
            },
            "exponential" => Self::Exponential {
                alpha: parse_param(param, crate::constants::DEFAULT_EXPONENTIAL_ALPHA)?,
            },
            _ => return Err(Error::FilterError(format!("Unknown filter type: {name}"))),
        };

        parsed.validate()?;
        Ok(parsed)
    }

    /// Check parameters without building the filter
    ///
    /// # Errors
    ///
    /// Returns [`Error::FilterError`] describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::None => Ok(()),
            Self::MovingAverage { window } | Self::Median { window } if window == 0 => Err(Error::FilterError(
                "Window size must be greater than 0".to_string(),
            )),
            Self::MovingAverage { .. } | Self::Median { .. } => Ok(()),
            Self::Exponential { alpha } if !(alpha > 0.0 && alpha <= 1.0) => {
                Err(Error::FilterError(format!("Alpha must be in (0, 1], got {alpha}")))
            }
            Self::Exponential { .. } => Ok(()),
        }
    }

    /// Build a fresh filter instance
    ///
    /// # Panics
    ///
    /// Panics if the spec was constructed by hand with invalid parameters;
    /// specs from [`FilterSpec::parse`] are always valid.
    #[must_use]
    pub fn build(&self) -> Box<dyn AngleFilter> {
        match *self {
            Self::None => Box::new(NoFilter::default()),
            Self::MovingAverage { window } => Box::new(moving_average::MovingAverageFilter::new(window)),
            Self::Median { window } => Box::new(median::MedianFilter::new(window)),
            Self::Exponential { alpha } => Box::new(exponential::ExponentialFilter::new(alpha)),
        }
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::MovingAverage {
            window: crate::constants::DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::MovingAverage { window } => write!(f, "moving_average:{window}"),
            Self::Median { window } => write!(f, "median:{window}"),
            Self::Exponential { alpha } => write!(f, "exponential:{alpha}"),
        }
    }
}

fn parse_param<T: std::str::FromStr>(param: Option<&str>, default: T) -> Result<T> {
    match param {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::FilterError(format!("Invalid filter parameter: {raw}"))),
    }
}

/// Create an angle filter from a spec string
///
/// # Errors
///
/// Returns an error if the spec cannot be parsed or its parameters are invalid.
pub fn create_filter(spec: &str) -> Result<Box<dyn AngleFilter>> {
    Ok(FilterSpec::parse(spec)?.build())
}

/// One filter per tracked angle kind
pub struct SmoothingBank {
    spec: FilterSpec,
    filters: [Box<dyn AngleFilter>; 4],
}

impl SmoothingBank {
    /// Build a bank whose filters all follow `spec`
    ///
    /// # Errors
    ///
    /// Returns an error if `spec` has invalid parameters.
    pub fn new(spec: FilterSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            filters: [spec.build(), spec.build(), spec.build(), spec.build()],
        })
    }

    /// Push a sample for `kind` and return its smoothed value
    pub fn push(&mut self, kind: AngleKind, sample: f64) -> f64 {
        self.filters[kind.index()].apply(sample)
    }

    /// Smoothed value for `kind` without pushing, `None` while empty
    #[must_use]
    pub fn current(&self, kind: AngleKind) -> Option<f64> {
        self.filters[kind.index()].current()
    }

    /// Samples currently held for `kind`, oldest first
    #[must_use]
    pub fn history(&self, kind: AngleKind) -> Vec<f64> {
        self.filters[kind.index()].history()
    }

    #[must_use]
    pub fn spec(&self) -> FilterSpec {
        self.spec
    }

    /// Clear every buffer
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}

impl Default for SmoothingBank {
    fn default() -> Self {
        let spec = FilterSpec::default();
        Self {
            spec,
            filters: [spec.build(), spec.build(), spec.build(), spec.build()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter() {
        let mut filter = NoFilter::default();
        assert_eq!(filter.current(), None);
        assert_eq!(filter.apply(10.0), 10.0);
        assert_eq!(filter.current(), Some(10.0));
    }

    #[test]
    fn test_create_filter() {
        assert!(create_filter("none").is_ok());
        assert!(create_filter("moving_average").is_ok());
        assert!(create_filter("median:3").is_ok());
        assert!(create_filter("unknown").is_err());
    }

    #[test]
    fn test_parse_spec() {
        assert_eq!(FilterSpec::parse("movingaverage:7").unwrap(), FilterSpec::MovingAverage { window: 7 });
        assert_eq!(FilterSpec::parse("moving_average").unwrap(), FilterSpec::default());
        assert_eq!(FilterSpec::parse(" Exponential:0.25 ").unwrap(), FilterSpec::Exponential { alpha: 0.25 });
        assert!(FilterSpec::parse("median:abc").is_err());
        assert!(FilterSpec::parse("median:3:1").is_err());
    }

    #[test]
    fn test_spec_display_round_trip() {
        for spec in ["none", "moving_average:5", "median:3", "exponential:0.5"] {
            assert_eq!(FilterSpec::parse(spec).unwrap().to_string(), spec);
        }
    }

    #[test]
    fn test_bank_buffers_are_independent() {
        let mut bank = SmoothingBank::default();
        assert_eq!(bank.push(AngleKind::Limb, 100.0), 100.0);
        assert_eq!(bank.push(AngleKind::Limb, 120.0), 110.0);
        assert_eq!(bank.push(AngleKind::Body, 180.0), 180.0);

        assert_eq!(bank.history(AngleKind::Limb), vec![100.0, 120.0]);
        assert_eq!(bank.history(AngleKind::Body), vec![180.0]);
        assert_eq!(bank.current(AngleKind::Flare), None);

        bank.reset();
        assert!(bank.history(AngleKind::Limb).is_empty());
    }

    #[test]
    fn test_bank_rejects_invalid_spec() {
        assert!(SmoothingBank::new(FilterSpec::Median { window: 0 }).is_err());
    }
}
