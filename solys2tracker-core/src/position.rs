//! Angular positions, offsets and observer location.

use std::ops::{Add, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Normalizes an azimuth to the half-open range `[0, 360)`.
#[inline]
#[must_use]
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    let wrapped = azimuth.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Horizontal position of the tracker head, in degrees.
///
/// Azimuth is measured from north through east. Zenith is the angle from
/// the local vertical (90° minus the elevation).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub azimuth: f64,
    pub zenith: f64,
}

impl Position {
    /// Creates a position, wrapping the azimuth into `[0, 360)`.
    #[must_use]
    pub fn new(azimuth: f64, zenith: f64) -> Self {
        Self {
            azimuth: normalize_azimuth(azimuth),
            zenith,
        }
    }

    /// Elevation above the horizon in degrees.
    #[inline]
    #[must_use]
    pub fn elevation(&self) -> f64 {
        90.0 - self.zenith
    }

    /// Whether the position is above the horizon.
    #[inline]
    #[must_use]
    pub fn is_above_horizon(&self) -> bool {
        self.zenith < 90.0
    }

    /// Signed difference `self - other`, with the azimuth part taken the
    /// short way around the circle.
    #[must_use]
    pub fn offset_from(&self, other: &Position) -> Offset {
        let mut daz = self.azimuth - other.azimuth;
        if daz > 180.0 {
            daz -= 360.0;
        } else if daz < -180.0 {
            daz += 360.0;
        }
        Offset::new(daz, self.zenith - other.zenith)
    }
}

/// Angular offset applied on top of a position, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Offset {
    pub azimuth: f64,
    pub zenith: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset {
        azimuth: 0.0,
        zenith: 0.0,
    };

    #[must_use]
    pub fn new(azimuth: f64, zenith: f64) -> Self {
        Self { azimuth, zenith }
    }
}

impl Add<Offset> for Position {
    type Output = Position;

    fn add(self, rhs: Offset) -> Position {
        Position::new(self.azimuth + rhs.azimuth, self.zenith + rhs.zenith)
    }
}

impl Sub<Offset> for Position {
    type Output = Position;

    fn sub(self, rhs: Offset) -> Position {
        self + (-rhs)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.azimuth, -self.zenith)
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.azimuth + rhs.azimuth, self.zenith + rhs.zenith)
    }
}

/// Geographic location of the instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observer {
    /// Latitude in degrees (north positive).
    pub latitude: f64,
    /// Longitude in degrees (east positive).
    pub longitude: f64,
    /// Height above sea level in metres.
    pub height: f64,
}

impl Observer {
    /// Creates a validated observer location.
    pub fn new(latitude: f64, longitude: f64, height: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && height.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(Error::InvalidLocation {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_azimuth_wraps() {
        let p = Position::new(359.5, 30.0) + Offset::new(1.0, 0.0);
        assert_relative_eq!(p.azimuth, 0.5, epsilon = 1e-12);

        let p = Position::new(0.25, 30.0) - Offset::new(0.5, 0.0);
        assert_relative_eq!(p.azimuth, 359.75, epsilon = 1e-12);
        assert_relative_eq!(Position::new(-720.0, 0.0).azimuth, 0.0);
    }

    #[test]
    fn test_offset_from_short_way() {
        let a = Position::new(1.0, 40.0);
        let b = Position::new(359.0, 41.0);
        let d = a.offset_from(&b);
        assert_relative_eq!(d.azimuth, 2.0, epsilon = 1e-12);
        assert_relative_eq!(d.zenith, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_horizon() {
        assert!(Position::new(10.0, 89.9).is_above_horizon());
        assert!(!Position::new(10.0, 90.5).is_above_horizon());
        assert_relative_eq!(Position::new(0.0, 30.0).elevation(), 60.0);
    }

    #[test]
    fn test_observer_validation() {
        assert!(Observer::new(41.66, -4.70, 705.0).is_ok());
        assert!(Observer::new(91.0, 0.0, 0.0).is_err());
        assert!(Observer::new(0.0, 181.0, 0.0).is_err());
        assert!(Observer::new(f64::NAN, 0.0, 0.0).is_err());
    }
}
