//! Position providers and the SAFE fallback policy.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use rayon::prelude::*;

use solys2tracker_core::{Body, Observer, Position};

use crate::coords::equatorial_to_horizontal;
use crate::leapseconds::LeapSeconds;
use crate::moon::moon_equatorial;
use crate::sun::sun_equatorial;
use crate::time::{greenwich_mean_sidereal_time, julian_centuries, julian_day, SECONDS_PER_DAY};
use crate::{Error, Result};

/// Validity of the analytic series, in Julian centuries from J2000.
const MAX_CENTURIES: f64 = 10.0;

/// Source of topocentric body positions.
pub trait EphemerisProvider: Send + Sync {
    /// Position of `body` seen by `observer` at `time`.
    fn position(&self, body: Body, observer: &Observer, time: DateTime<Utc>) -> Result<Position>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

impl<P: EphemerisProvider + ?Sized> EphemerisProvider for Box<P> {
    fn position(&self, body: Body, observer: &Observer, time: DateTime<Utc>) -> Result<Position> {
        (**self).position(body, observer, time)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Series-based provider.
#[derive(Debug, Clone)]
pub struct AnalyticEphemeris {
    leap_seconds: LeapSeconds,
    refraction: bool,
    name: String,
}

impl Default for AnalyticEphemeris {
    fn default() -> Self {
        Self::new(LeapSeconds::builtin())
    }
}

impl AnalyticEphemeris {
    /// Creates a provider using the given leap-second table. Refraction is on.
    #[must_use]
    pub fn new(leap_seconds: LeapSeconds) -> Self {
        let name = format!("analytic ({})", leap_seconds.source());
        Self {
            leap_seconds,
            refraction: true,
            name,
        }
    }

    /// Enables or disables the atmospheric refraction correction.
    #[must_use]
    pub fn with_refraction(mut self, refraction: bool) -> Self {
        self.refraction = refraction;
        self
    }

    #[must_use]
    pub fn leap_seconds(&self) -> &LeapSeconds {
        &self.leap_seconds
    }
}

impl EphemerisProvider for AnalyticEphemeris {
    fn position(&self, body: Body, observer: &Observer, time: DateTime<Utc>) -> Result<Position> {
        let jd_ut = julian_day(time);
        if julian_centuries(jd_ut).abs() > MAX_CENTURIES {
            return Err(Error::TimeOutOfRange(jd_ut));
        }
        let jd_tt = jd_ut + self.leap_seconds.delta_t(time) / SECONDS_PER_DAY;

        let eq = match body {
            Body::Sun => sun_equatorial(jd_tt),
            Body::Moon => moon_equatorial(jd_tt),
        };
        let lst = greenwich_mean_sidereal_time(jd_ut) + observer.longitude;
        let pos = equatorial_to_horizontal(&eq, observer, lst, self.refraction);

        if !pos.azimuth.is_finite() || !pos.zenith.is_finite() {
            return Err(Error::NonFinite("horizontal position"));
        }
        Ok(pos)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Provider that never lets an ephemeris failure escape when a fallback
/// can answer.
///
/// Failures of the primary provider are logged and answered by the
/// fallback; only if both fail is an error returned.
pub struct SafeEphemeris<P, F> {
    primary: P,
    fallback: F,
}

impl<P: EphemerisProvider, F: EphemerisProvider> SafeEphemeris<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }
}

impl<P: EphemerisProvider, F: EphemerisProvider> EphemerisProvider for SafeEphemeris<P, F> {
    fn position(&self, body: Body, observer: &Observer, time: DateTime<Utc>) -> Result<Position> {
        match self.primary.position(body, observer, time) {
            Ok(pos) => Ok(pos),
            Err(e) => {
                warn!(
                    "{} failed for {body} at {time}: {e}; using {}",
                    self.primary.name(),
                    self.fallback.name()
                );
                self.fallback.position(body, observer, time)
            }
        }
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}

/// Computes positions for many instants in parallel, preserving order.
pub fn positions_over<E: EphemerisProvider>(
    provider: &E,
    body: Body,
    observer: &Observer,
    times: &[DateTime<Utc>],
) -> Vec<Result<Position>> {
    debug!(
        "computing {} {body} positions with {}",
        times.len(),
        provider.name()
    );
    times
        .par_iter()
        .map(|&t| provider.position(body, observer, t))
        .collect()
}
