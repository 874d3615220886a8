//! Motion plans: continuous tracking and the Cross / Mesh alignment sweeps.
//!
//! A sweep visits a list of angular offsets around the computed position of
//! the target body. At every point the instrument waits a `countdown` (the
//! measurement window, during which the spectroradiometer captures) and then
//! a `rest` before moving on.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Body, Error, Offset, Result};

/// Tolerance in degrees for a step to divide the sweep width.
const STEP_TOLERANCE: f64 = 1e-6;

/// Continuous tracking of a body.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPlan {
    pub body: Body,
    /// Time between consecutive repositionings.
    pub interval: Duration,
    /// Systematic pointing error, subtracted from every target.
    pub drift: Offset,
}

impl TrackPlan {
    /// Validates the plan.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidSweep("tracking interval must be > 0".into()));
        }
        Ok(())
    }
}

/// Kind of sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SweepKind {
    Cross,
    Mesh,
}

impl SweepKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SweepKind::Cross => "cross",
            SweepKind::Mesh => "mesh",
        }
    }
}

impl std::fmt::Display for SweepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepKind::Cross => write!(f, "Cross"),
            SweepKind::Mesh => write!(f, "Mesh"),
        }
    }
}

/// Parameters shared by the Cross and Mesh sweeps.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    pub body: Body,
    /// Half-width of the sweep in degrees: offsets go from `-range` to `range`.
    pub range: f64,
    /// Distance between consecutive offsets in degrees.
    pub step: f64,
    /// Measurement window at each point.
    pub countdown: Duration,
    /// Pause after each measurement.
    pub rest: Duration,
    /// Systematic pointing error, subtracted from every target.
    pub drift: Offset,
}

/// A Cross sweep: one pass along azimuth, then one along zenith.
pub type CrossPlan = SweepPlan;
/// A Mesh sweep: the full azimuth × zenith grid.
pub type MeshPlan = SweepPlan;

/// One point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepPoint {
    /// Position in the sweep, starting at 0.
    pub index: usize,
    pub offset: Offset,
}

impl SweepPlan {
    /// Validates ranges and steps.
    ///
    /// The step must divide `2 * range` so that the last offset lands on
    /// `+range`, which is where the analysis places it.
    pub fn validate(&self) -> Result<()> {
        if !self.range.is_finite() || self.range <= 0.0 {
            return Err(Error::InvalidSweep(format!(
                "range must be > 0, got {}",
                self.range
            )));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(Error::InvalidSweep(format!(
                "step must be > 0, got {}",
                self.step
            )));
        }
        let width = 2.0 * self.range;
        if self.step > width + STEP_TOLERANCE {
            return Err(Error::InvalidSweep(format!(
                "step {} is larger than the full sweep width {width}",
                self.step
            )));
        }
        let steps = (width / self.step).round();
        if (steps * self.step - width).abs() > STEP_TOLERANCE {
            return Err(Error::InvalidSweep(format!(
                "step {} does not divide the full sweep width {width}",
                self.step
            )));
        }
        Ok(())
    }

    /// Number of offsets along one axis, `round(2 * range / step) + 1`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn points_per_axis(&self) -> usize {
        (2.0 * self.range / self.step).round() as usize + 1
    }

    /// Offsets along one axis, from `-range` upward by `step`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn axis_offsets(&self) -> Vec<f64> {
        (0..self.points_per_axis())
            .map(|i| -self.range + i as f64 * self.step)
            .collect()
    }

    /// Points of the sweep in visiting order.
    pub fn points(&self, kind: SweepKind) -> Result<Vec<SweepPoint>> {
        self.validate()?;
        let axis = self.axis_offsets();
        let offsets: Vec<Offset> = match kind {
            SweepKind::Cross => axis
                .iter()
                .map(|&az| Offset::new(az, 0.0))
                .chain(axis.iter().map(|&ze| Offset::new(0.0, ze)))
                .collect(),
            SweepKind::Mesh => axis
                .iter()
                .flat_map(|&az| axis.iter().map(move |&ze| Offset::new(az, ze)))
                .collect(),
        };
        Ok(offsets
            .into_iter()
            .enumerate()
            .map(|(index, offset)| SweepPoint { index, offset })
            .collect())
    }

    /// Total number of points the sweep visits.
    #[must_use]
    pub fn total_points(&self, kind: SweepKind) -> usize {
        let n = self.points_per_axis();
        match kind {
            SweepKind::Cross => 2 * n,
            SweepKind::Mesh => n * n,
        }
    }

    /// Lower bound on the sweep duration (waits only, motion excluded).
    #[must_use]
    pub fn estimated_duration(&self, kind: SweepKind) -> Duration {
        let per_point = self.countdown + self.rest;
        per_point.saturating_mul(u32::try_from(self.total_points(kind)).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plan(range: f64, step: f64) -> SweepPlan {
        SweepPlan {
            body: Body::Moon,
            range,
            step,
            countdown: Duration::from_secs(5),
            rest: Duration::from_secs(1),
            drift: Offset::ZERO,
        }
    }

    #[test]
    fn test_cross_points() {
        let p = plan(0.8, 0.1);
        let pts = p.points(SweepKind::Cross).unwrap();
        assert_eq!(p.points_per_axis(), 17);
        assert_eq!(pts.len(), 34);
        assert_relative_eq!(pts[0].offset.azimuth, -0.8, epsilon = 1e-9);
        assert_relative_eq!(pts[0].offset.zenith, 0.0);
        assert_relative_eq!(pts[16].offset.azimuth, 0.8, epsilon = 1e-9);
        assert_relative_eq!(pts[17].offset.azimuth, 0.0);
        assert_relative_eq!(pts[17].offset.zenith, -0.8, epsilon = 1e-9);
        assert_relative_eq!(pts[33].offset.zenith, 0.8, epsilon = 1e-9);
        assert!(pts.iter().enumerate().all(|(i, p)| p.index == i));
    }

    #[test]
    fn test_mesh_ordering() {
        let p = plan(1.0, 1.0);
        let pts = p.points(SweepKind::Mesh).unwrap();
        let n = p.points_per_axis();
        assert_eq!(n, 3);
        assert_eq!(pts.len(), 9);
        let axis = p.axis_offsets();
        for i in 0..n {
            for j in 0..n {
                let pt = pts[i * n + j];
                assert_relative_eq!(pt.offset.azimuth, axis[i]);
                assert_relative_eq!(pt.offset.zenith, axis[j]);
            }
        }
    }

    #[test]
    fn test_step_not_dividing_range() {
        let p = plan(1.0, 0.3);
        let err = p.points(SweepKind::Cross).unwrap_err();
        assert!(matches!(err, Error::InvalidSweep(ref m) if m.contains("does not divide")));
        assert!(plan(0.8, 0.3).validate().is_err());
        // floating-point noise still divides
        assert!(plan(0.3, 0.1).validate().is_ok());
        assert_eq!(plan(0.3, 0.1).points_per_axis(), 7);
    }

    #[test]
    fn test_invalid_plans() {
        assert!(plan(0.0, 0.1).validate().is_err());
        assert!(plan(1.0, 0.0).validate().is_err());
        assert!(plan(1.0, 2.5).validate().is_err());
        assert!(plan(f64::NAN, 0.1).validate().is_err());
        assert!(plan(1.0, 2.0).validate().is_ok());
    }

    #[test]
    fn test_estimated_duration() {
        let p = plan(0.8, 0.1);
        assert_eq!(
            p.estimated_duration(SweepKind::Cross),
            Duration::from_secs(6 * 34)
        );
    }

    #[test]
    fn test_track_plan_validation() {
        let mut t = TrackPlan {
            body: Body::Sun,
            interval: Duration::from_secs(10),
            drift: Offset::ZERO,
        };
        assert!(t.validate().is_ok());
        t.interval = Duration::ZERO;
        assert!(t.validate().is_err());
    }
}
