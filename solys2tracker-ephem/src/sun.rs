//! Apparent geocentric position of the Sun (Meeus, chapter 25, low accuracy).
//!
//! Accuracy is about 0.01° over several centuries around J2000.

use crate::coords::Equatorial;
use crate::time::julian_centuries;

/// Apparent solar coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunApparent {
    /// Apparent ecliptic longitude in degrees.
    pub longitude: f64,
    /// True obliquity of the ecliptic in degrees.
    pub obliquity: f64,
    /// Earth-Sun distance in astronomical units.
    pub distance_au: f64,
}

/// Computes the apparent longitude, obliquity and distance for a TT Julian day.
#[must_use]
pub fn sun_apparent(jd_tt: f64) -> SunApparent {
    let t = julian_centuries(jd_tt);
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = 357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t;
    let e = 0.016_708_634 - 0.000_042_037 * t - 0.000_000_126_7 * t * t;
    let m_rad = m.to_radians();
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m_rad.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m_rad).sin()
        + 0.000_289 * (3.0 * m_rad).sin();
    let true_longitude = l0 + c;
    let anomaly = (m + c).to_radians();
    let distance_au = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * anomaly.cos());

    let omega = (125.04 - 1_934.136 * t).to_radians();
    let longitude = (true_longitude - 0.005_69 - 0.004_78 * omega.sin()).rem_euclid(360.0);

    let eps0 = 23.0 + 26.0 / 60.0 + 21.448 / 3600.0
        - (46.815_0 * t + 0.000_59 * t * t - 0.001_813 * t * t * t) / 3600.0;
    let obliquity = eps0 + 0.002_56 * omega.cos();

    SunApparent {
        longitude,
        obliquity,
        distance_au,
    }
}

/// Apparent geocentric right ascension and declination of the Sun.
#[must_use]
pub fn sun_equatorial(jd_tt: f64) -> Equatorial {
    let sun = sun_apparent(jd_tt);
    let lambda = sun.longitude.to_radians();
    let eps = sun.obliquity.to_radians();
    let ra = (eps.cos() * lambda.sin()).atan2(lambda.cos()).to_degrees();
    let dec = (eps.sin() * lambda.sin()).asin().to_degrees();
    Equatorial {
        right_ascension: ra.rem_euclid(360.0),
        declination: dec,
        distance_km: sun.distance_au * crate::coords::AU_KM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_meeus_example_25a() {
        // 1992 October 13, 0h TD
        let jd = 2_448_908.5;
        let sun = sun_apparent(jd);
        assert_relative_eq!(sun.longitude, 199.908_95, epsilon = 1e-3);
        assert_relative_eq!(sun.distance_au, 0.997_66, epsilon = 1e-4);

        let eq = sun_equatorial(jd);
        assert_relative_eq!(eq.right_ascension, 198.380_83, epsilon = 2e-3);
        assert_relative_eq!(eq.declination, -7.785_07, epsilon = 2e-3);
    }
}
