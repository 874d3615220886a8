//! Analysis of ASD captures taken during Cross and Mesh sweeps.
//!
//! Each capture is reduced to the mean value inside three narrow wavelength
//! windows, one per ASD detector (VNIR, SWIR1, SWIR2). The sequence of
//! reduced captures is then reshaped into either two profiles (Cross) or a
//! square grid (Mesh), from which the offset of the signal peak is estimated.

use ndarray::Array2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Offset, Result};

/// Number of ASD detectors.
pub const DETECTOR_COUNT: usize = 3;

/// Inclusive wavelength windows (nm) averaged for each detector.
pub const DETECTOR_BANDS: [(f64, f64); DETECTOR_COUNT] =
    [(545.0, 555.0), (1635.0, 1645.0), (2195.0, 2205.0)];

/// A single spectrum: paired wavelength (nm) and value columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    pub wavelengths: Vec<f64>,
    pub values: Vec<f64>,
}

impl Spectrum {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            wavelengths: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, wavelength: f64, value: f64) {
        self.wavelengths.push(wavelength);
        self.values.push(value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Mean of the values whose wavelength lies in `[lo, hi]`.
    ///
    /// Returns NaN when the window holds no sample.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn window_mean(&self, lo: f64, hi: f64) -> f64 {
        let (sum, count) = self
            .wavelengths
            .iter()
            .zip(&self.values)
            .filter(|(w, _)| (lo..=hi).contains(*w))
            .fold((0.0, 0usize), |(s, c), (_, v)| (s + v, c + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }

    /// Reduces the spectrum to one mean per detector window.
    #[must_use]
    pub fn band_means(&self) -> BandMeans {
        BandMeans(DETECTOR_BANDS.map(|(lo, hi)| self.window_mean(lo, hi)))
    }
}

/// Per-detector means of one capture.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BandMeans(pub [f64; DETECTOR_COUNT]);

impl BandMeans {
    #[inline]
    #[must_use]
    pub fn detector(&self, i: usize) -> f64 {
        self.0[i]
    }
}

/// Rescales `a` and `b` jointly so their common minimum maps to `t_min` and
/// their common maximum to `t_max`.
///
/// `min_override` replaces the computed minimum, which lets several runs be
/// plotted against the same dark level. Constant input maps to `t_min`.
#[must_use]
pub fn normalize_both(
    a: &[f64],
    b: &[f64],
    t_min: f64,
    t_max: f64,
    min_override: Option<f64>,
) -> (Vec<f64>, Vec<f64>) {
    let all = || a.iter().chain(b).copied().filter(|v| v.is_finite());
    let min = min_override.unwrap_or_else(|| all().fold(f64::INFINITY, f64::min));
    let max = all().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let scale = |v: f64| {
        if span.abs() < f64::EPSILON {
            t_min
        } else {
            (v - min) * (t_max - t_min) / span + t_min
        }
    };
    (
        a.iter().map(|&v| scale(v)).collect(),
        b.iter().map(|&v| scale(v)).collect(),
    )
}

/// Weighted centroid of the part of a profile above its mid level.
///
/// Returns `None` when the profile is flat or has no finite sample.
fn peak_centroid(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let finite = || ys.iter().copied().filter(|v| v.is_finite());
    let min = finite().fold(f64::INFINITY, f64::min);
    let max = finite().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || (max - min).abs() < f64::EPSILON {
        return None;
    }
    let mid = (min + max) / 2.0;
    let (num, den) = xs
        .iter()
        .zip(ys)
        .filter(|(_, y)| y.is_finite() && **y > mid)
        .fold((0.0, 0.0), |(n, d), (x, y)| (n + x * (y - mid), d + (y - mid)));
    (den > 0.0).then(|| num / den)
}

/// Mean of the finite values, or `None` if there is none.
#[allow(clippy::cast_precision_loss)]
fn finite_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Outcome of a sweep analysis: where the signal peaks and what to do next.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NextStep {
    /// Offset of the signal peak relative to the sweep centre.
    pub peak: Offset,
    /// Drift to use for the next run, given the drift of the analysed run.
    pub suggested_drift: Offset,
}

impl NextStep {
    fn from_peak(peak: Offset, previous_drift: Offset) -> Self {
        Self {
            peak,
            suggested_drift: previous_drift + (-peak),
        }
    }

    /// Short instruction for the user.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Signal peak at azimuth {:+.3}°, zenith {:+.3}°. Set drift to azimuth {:+.3}°, zenith {:+.3}° and repeat to confirm.",
            self.peak.azimuth,
            self.peak.zenith,
            self.suggested_drift.azimuth,
            self.suggested_drift.zenith
        )
    }
}

/// Azimuth and zenith profiles of a Cross sweep, per detector.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossProfile {
    /// Offsets of each profile sample, shared by both axes.
    pub offsets: Vec<f64>,
    /// `azimuth[d][i]`: detector `d` at azimuth offset `offsets[i]`.
    pub azimuth: [Vec<f64>; DETECTOR_COUNT],
    /// `zenith[d][i]`: detector `d` at zenith offset `offsets[i]`.
    pub zenith: [Vec<f64>; DETECTOR_COUNT],
}

impl CrossProfile {
    /// Builds the profiles from captures in sweep order.
    ///
    /// The first half of the captures is the azimuth pass, the second half
    /// the zenith pass.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_measurements(measurements: &[BandMeans], range: f64) -> Result<Self> {
        let len = measurements.len();
        if len < 4 || len % 2 != 0 {
            return Err(Error::MeasurementCount {
                expected: "an even count of at least 4".into(),
                actual: len,
            });
        }
        let n = len / 2;
        let step = 2.0 * range / (n - 1) as f64;
        let offsets = (0..n).map(|i| -range + i as f64 * step).collect();
        let column = |rows: &[BandMeans], d: usize| rows.iter().map(|m| m.0[d]).collect();
        let (az_rows, ze_rows) = measurements.split_at(n);
        Ok(Self {
            offsets,
            azimuth: std::array::from_fn(|d| column(az_rows, d)),
            zenith: std::array::from_fn(|d| column(ze_rows, d)),
        })
    }

    /// Profiles of one detector normalized jointly to `[0, 1]`.
    #[must_use]
    pub fn normalized(&self, detector: usize, min_override: Option<f64>) -> (Vec<f64>, Vec<f64>) {
        normalize_both(
            &self.azimuth[detector],
            &self.zenith[detector],
            0.0,
            1.0,
            min_override,
        )
    }

    /// Peak offset seen by one detector.
    #[must_use]
    pub fn detector_peak(&self, detector: usize) -> Option<Offset> {
        let az = peak_centroid(&self.offsets, &self.azimuth[detector])?;
        let ze = peak_centroid(&self.offsets, &self.zenith[detector])?;
        Some(Offset::new(az, ze))
    }

    /// Peak averaged over the detectors that saw one.
    #[must_use]
    pub fn next_step(&self, previous_drift: Offset) -> Option<NextStep> {
        let peaks: Vec<Offset> = (0..DETECTOR_COUNT)
            .filter_map(|d| self.detector_peak(d))
            .collect();
        let az = finite_mean(peaks.iter().map(|p| p.azimuth))?;
        let ze = finite_mean(peaks.iter().map(|p| p.zenith))?;
        Some(NextStep::from_peak(Offset::new(az, ze), previous_drift))
    }
}

/// Square azimuth × zenith grid of a Mesh sweep, per detector.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGrid {
    /// Offsets along both axes.
    pub offsets: Vec<f64>,
    /// `grids[d][[i, j]]`: detector `d` at azimuth `offsets[i]`, zenith `offsets[j]`.
    pub grids: [Array2<f64>; DETECTOR_COUNT],
}

impl MeshGrid {
    /// Builds the grids from captures in sweep order (row-major, azimuth outer).
    #[allow(clippy::cast_precision_loss)]
    pub fn from_measurements(measurements: &[BandMeans], range: f64) -> Result<Self> {
        let len = measurements.len();
        let n = integer_sqrt(len);
        if n < 2 || n * n != len {
            return Err(Error::MeasurementCount {
                expected: "a perfect square of at least 4".into(),
                actual: len,
            });
        }
        let step = 2.0 * range / (n - 1) as f64;
        let offsets = (0..n).map(|i| -range + i as f64 * step).collect();
        let grids = std::array::from_fn(|d| {
            Array2::from_shape_fn((n, n), |(i, j)| measurements[i * n + j].0[d])
        });
        Ok(Self { offsets, grids })
    }

    /// Grid side length.
    #[must_use]
    pub fn size(&self) -> usize {
        self.offsets.len()
    }

    /// Peak offset seen by one detector, from the centroid of the grid
    /// above its mid level.
    #[must_use]
    pub fn detector_peak(&self, detector: usize) -> Option<Offset> {
        let grid = &self.grids[detector];
        let finite = || grid.iter().copied().filter(|v| v.is_finite());
        let min = finite().fold(f64::INFINITY, f64::min);
        let max = finite().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || (max - min).abs() < f64::EPSILON {
            return None;
        }
        let mid = (min + max) / 2.0;
        let mut sum_w = 0.0;
        let mut sum_az = 0.0;
        let mut sum_ze = 0.0;
        for ((i, j), &v) in grid.indexed_iter() {
            if v.is_finite() && v > mid {
                let w = v - mid;
                sum_w += w;
                sum_az += w * self.offsets[i];
                sum_ze += w * self.offsets[j];
            }
        }
        (sum_w > 0.0).then(|| Offset::new(sum_az / sum_w, sum_ze / sum_w))
    }

    /// Peak averaged over the detectors that saw one.
    #[must_use]
    pub fn next_step(&self, previous_drift: Offset) -> Option<NextStep> {
        let peaks: Vec<Offset> = (0..DETECTOR_COUNT)
            .filter_map(|d| self.detector_peak(d))
            .collect();
        let az = finite_mean(peaks.iter().map(|p| p.azimuth))?;
        let ze = finite_mean(peaks.iter().map(|p| p.zenith))?;
        Some(NextStep::from_peak(Offset::new(az, ze), previous_drift))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn integer_sqrt(value: usize) -> usize {
    let mut root = (value as f64).sqrt() as usize;
    while root * root > value {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= value {
        root += 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spectrum() -> Spectrum {
        let mut s = Spectrum::default();
        for (w, v) in [
            (544.0, 100.0),
            (545.0, 1.0),
            (550.0, 2.0),
            (555.0, 3.0),
            (556.0, 100.0),
            (1640.0, 5.0),
            (2200.0, 7.0),
            (2201.0, 9.0),
        ] {
            s.push(w, v);
        }
        s
    }

    #[test]
    fn test_band_means_use_inclusive_windows() {
        let m = spectrum().band_means();
        assert_relative_eq!(m.detector(0), 2.0);
        assert_relative_eq!(m.detector(1), 5.0);
        assert_relative_eq!(m.detector(2), 8.0);
    }

    #[test]
    fn test_empty_window_is_nan() {
        let mut s = Spectrum::default();
        s.push(550.0, 1.0);
        assert!(s.band_means().detector(1).is_nan());
    }

    #[test]
    fn test_normalize_both() {
        let (a, b) = normalize_both(&[1.0, 2.0], &[3.0, 5.0], 0.0, 1.0, None);
        assert_relative_eq!(a[0], 0.0);
        assert_relative_eq!(a[1], 0.25);
        assert_relative_eq!(b[1], 1.0);

        let (a, _) = normalize_both(&[1.0, 2.0], &[3.0, 5.0], 0.0, 1.0, Some(0.0));
        assert_relative_eq!(a[0], 0.2);

        let (a, b) = normalize_both(&[4.0], &[4.0], 0.0, 1.0, None);
        assert_relative_eq!(a[0], 0.0);
        assert_relative_eq!(b[0], 0.0);
    }

    fn gaussian(x: f64, centre: f64) -> f64 {
        (-(x - centre).powi(2) / 0.02).exp()
    }

    #[test]
    fn test_cross_profile_peak() {
        let n = 17;
        let range = 0.8;
        let xs: Vec<f64> = (0..n).map(|i| -range + f64::from(i) * 0.1).collect();
        let mut ms = Vec::new();
        for &x in &xs {
            let v = gaussian(x, 0.2);
            ms.push(BandMeans([v, 2.0 * v, 3.0 * v]));
        }
        for &x in &xs {
            let v = gaussian(x, -0.1);
            ms.push(BandMeans([v, 2.0 * v, 3.0 * v]));
        }
        let profile = CrossProfile::from_measurements(&ms, range).unwrap();
        assert_eq!(profile.offsets.len(), 17);
        assert_relative_eq!(profile.offsets[0], -0.8, epsilon = 1e-12);
        assert_relative_eq!(profile.offsets[16], 0.8, epsilon = 1e-12);

        let peak = profile.detector_peak(0).unwrap();
        assert_relative_eq!(peak.azimuth, 0.2, epsilon = 0.02);
        assert_relative_eq!(peak.zenith, -0.1, epsilon = 0.02);

        let next = profile.next_step(Offset::new(0.05, 0.0)).unwrap();
        assert_relative_eq!(next.suggested_drift.azimuth, 0.05 - next.peak.azimuth);
        assert!(next.message().contains("Signal peak"));
    }

    #[test]
    fn test_cross_profile_rejects_odd_count() {
        let ms = vec![BandMeans([1.0; 3]); 5];
        assert!(CrossProfile::from_measurements(&ms, 0.8).is_err());
    }

    #[test]
    fn test_flat_profile_has_no_peak() {
        let ms = vec![BandMeans([1.0; 3]); 6];
        let profile = CrossProfile::from_measurements(&ms, 0.8).unwrap();
        assert!(profile.detector_peak(0).is_none());
        assert!(profile.next_step(Offset::ZERO).is_none());
    }

    #[test]
    fn test_mesh_grid_reshape_and_peak() {
        let n = 5;
        let range = 1.0;
        let axis: Vec<f64> = (0..n).map(|i| -1.0 + 0.5 * f64::from(i)).collect();
        let mut ms = Vec::new();
        for &az in &axis {
            for &ze in &axis {
                let v = gaussian(az, 0.5) * gaussian(ze, -0.5);
                ms.push(BandMeans([v, v, v]));
            }
        }
        let mesh = MeshGrid::from_measurements(&ms, range).unwrap();
        assert_eq!(mesh.size(), 5);
        // row 3 (az = 0.5), column 1 (ze = -0.5) is the maximum
        assert_relative_eq!(mesh.grids[0][[3, 1]], 1.0);
        let peak = mesh.detector_peak(0).unwrap();
        assert_relative_eq!(peak.azimuth, 0.5, epsilon = 1e-9);
        assert_relative_eq!(peak.zenith, -0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_mesh_grid_requires_square() {
        let ms = vec![BandMeans([1.0; 3]); 8];
        assert!(MeshGrid::from_measurements(&ms, 1.0).is_err());
        assert_eq!(integer_sqrt(49), 7);
        assert_eq!(integer_sqrt(50), 7);
    }
}
