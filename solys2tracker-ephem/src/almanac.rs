//! Low-precision Sun and Moon positions (Astronomical Almanac, sections C and D).
//!
//! About 0.01° for the Sun and 0.3° for the Moon near the present. The
//! series degrade slowly away from J2000 instead of diverging, and the
//! TT − UT offset is modelled without any leap-second table, so this
//! provider answers over a much wider time span than
//! [`AnalyticEphemeris`](crate::AnalyticEphemeris).

use chrono::{DateTime, Datelike, Utc};

use solys2tracker_core::{Body, Observer, Position};

use crate::coords::{equatorial_to_horizontal, Equatorial, AU_KM, EARTH_RADIUS_KM};
use crate::provider::EphemerisProvider;
use crate::time::{
    greenwich_mean_sidereal_time, julian_centuries, julian_day, J2000_JD, SECONDS_PER_DAY,
};
use crate::{Error, Result};

/// Validity of the low-precision series, in Julian centuries from J2000.
const MAX_CENTURIES: f64 = 30.0;

/// Approximate TT − UT in seconds for a calendar year.
///
/// Espenak–Meeus polynomial between 1986 and 2050, Morrison–Stephenson
/// parabola elsewhere.
#[must_use]
pub fn approximate_delta_t(year: f64) -> f64 {
    if (1986.0..2050.0).contains(&year) {
        let t = year - 2000.0;
        if year < 2005.0 {
            63.86 + 0.3345 * t - 0.060_374 * t * t
                + 0.001_727_5 * t * t * t
                + 0.000_651_814 * t.powi(4)
                + 0.000_023_734_59 * t.powi(5)
        } else {
            62.92 + 0.322_17 * t + 0.005_589 * t * t
        }
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

fn degrees_sin(x: f64) -> f64 {
    x.to_radians().sin()
}

fn degrees_cos(x: f64) -> f64 {
    x.to_radians().cos()
}

fn ecliptic_to_equatorial(lambda: f64, beta: f64, eps: f64, distance_km: f64) -> Equatorial {
    let (l, b, e) = (lambda.to_radians(), beta.to_radians(), eps.to_radians());
    let ra = (l.sin() * e.cos() - b.tan() * e.sin()).atan2(l.cos());
    let dec = (b.sin() * e.cos() + b.cos() * e.sin() * l.sin()).asin();
    Equatorial {
        right_ascension: ra.to_degrees().rem_euclid(360.0),
        declination: dec.to_degrees(),
        distance_km,
    }
}

/// Low-precision geocentric Sun for a TT Julian day.
#[must_use]
pub fn almanac_sun(jd_tt: f64) -> Equatorial {
    let n = jd_tt - J2000_JD;
    let l = 280.460 + 0.985_647_4 * n;
    let g = 357.528 + 0.985_600_3 * n;
    let lambda = l + 1.915 * degrees_sin(g) + 0.020 * degrees_sin(2.0 * g);
    let eps = 23.439 - 0.000_000_4 * n;
    let r = 1.000_14 - 0.016_71 * degrees_cos(g) - 0.000_14 * degrees_cos(2.0 * g);
    ecliptic_to_equatorial(lambda.rem_euclid(360.0), 0.0, eps, r * AU_KM)
}

/// Low-precision geocentric Moon for a TT Julian day.
#[must_use]
pub fn almanac_moon(jd_tt: f64) -> Equatorial {
    let t = julian_centuries(jd_tt);
    let lambda = 218.32 + 481_267.881 * t + 6.29 * degrees_sin(135.0 + 477_198.87 * t)
        - 1.27 * degrees_sin(259.3 - 413_335.36 * t)
        + 0.66 * degrees_sin(235.7 + 890_534.22 * t)
        + 0.21 * degrees_sin(269.9 + 954_397.74 * t)
        - 0.19 * degrees_sin(357.5 + 35_999.05 * t)
        - 0.11 * degrees_sin(186.5 + 966_404.03 * t);
    let beta = 5.13 * degrees_sin(93.3 + 483_202.02 * t)
        + 0.28 * degrees_sin(228.2 + 960_400.89 * t)
        - 0.28 * degrees_sin(318.3 + 6_003.15 * t)
        - 0.17 * degrees_sin(217.6 - 407_332.21 * t);
    let parallax = 0.950_8
        + 0.051_8 * degrees_cos(135.0 + 477_198.87 * t)
        + 0.009_5 * degrees_cos(259.3 - 413_335.36 * t)
        + 0.007_8 * degrees_cos(235.7 + 890_534.22 * t)
        + 0.002_8 * degrees_cos(269.9 + 954_397.74 * t);
    let eps = 23.439 - 0.013_0 * t;
    let distance_km = EARTH_RADIUS_KM / degrees_sin(parallax);
    ecliptic_to_equatorial(lambda.rem_euclid(360.0), beta, eps, distance_km)
}

/// Kernel-free provider built on the almanac series.
#[derive(Debug, Clone)]
pub struct AlmanacEphemeris {
    refraction: bool,
}

impl Default for AlmanacEphemeris {
    fn default() -> Self {
        Self { refraction: true }
    }
}

impl AlmanacEphemeris {
    #[must_use]
    pub fn with_refraction(mut self, refraction: bool) -> Self {
        self.refraction = refraction;
        self
    }
}

impl EphemerisProvider for AlmanacEphemeris {
    fn position(&self, body: Body, observer: &Observer, time: DateTime<Utc>) -> Result<Position> {
        let jd_ut = julian_day(time);
        if julian_centuries(jd_ut).abs() > MAX_CENTURIES {
            return Err(Error::TimeOutOfRange(jd_ut));
        }
        let year = f64::from(time.year()) + f64::from(time.ordinal0()) / 365.25;
        let jd_tt = jd_ut + approximate_delta_t(year) / SECONDS_PER_DAY;

        let eq = match body {
            Body::Sun => almanac_sun(jd_tt),
            Body::Moon => almanac_moon(jd_tt),
        };
        let lst = greenwich_mean_sidereal_time(jd_ut) + observer.longitude;
        let pos = equatorial_to_horizontal(&eq, observer, lst, self.refraction);

        if !pos.azimuth.is_finite() || !pos.zenith.is_finite() {
            return Err(Error::NonFinite("horizontal position"));
        }
        Ok(pos)
    }

    fn name(&self) -> &str {
        "almanac (low precision)"
    }
}
