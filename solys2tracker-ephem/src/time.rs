//! Time scales: Julian day, Julian centuries and sidereal time.

use chrono::{DateTime, Utc};

/// Julian day of the Unix epoch (1970-01-01T00:00:00 UTC).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian day of the J2000.0 epoch.
pub const J2000_JD: f64 = 2_451_545.0;
/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian day of a UTC instant.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn julian_day(time: DateTime<Utc>) -> f64 {
    let secs = time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) * 1e-9;
    UNIX_EPOCH_JD + secs / SECONDS_PER_DAY
}

/// Julian centuries since J2000.0.
#[inline]
#[must_use]
pub fn julian_centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / 36_525.0
}

/// Greenwich mean sidereal time in degrees `[0, 360)` for a UT Julian day.
#[must_use]
pub fn greenwich_mean_sidereal_time(jd_ut: f64) -> f64 {
    let t = julian_centuries(jd_ut);
    let theta = 280.460_618_37 + 360.985_647_366_29 * (jd_ut - J2000_JD) + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    theta.rem_euclid(360.0)
}
