//! solys2tracker-ephem: Sun and Moon positions for the Solys2 tracker.
//!
//! Positions are computed from analytic series (Meeus, *Astronomical
//! Algorithms*), corrected for topocentric parallax and optionally for
//! atmospheric refraction. The TT − UTC offset comes from a leap-second
//! table which can be loaded from a NAIF leapseconds kernel.
//!
//! # Key Components
//!
//! - [`EphemerisProvider`] - Trait implemented by every position source
//! - [`AnalyticEphemeris`] - Series-based provider
//! - [`AlmanacEphemeris`] - Low-precision, kernel-free provider used as fallback
//! - [`SafeEphemeris`] - Provider that falls back instead of failing
//! - [`LeapSeconds`] - ΔAT table, built in or parsed from a `.tls` kernel

mod almanac;
mod coords;
mod error;
pub mod leapseconds;
mod moon;
mod provider;
mod sun;
pub mod time;

pub use almanac::{almanac_moon, almanac_sun, approximate_delta_t, AlmanacEphemeris};
pub use coords::{equatorial_to_horizontal, refraction_correction, Equatorial};
pub use error::{Error, Result};
pub use leapseconds::LeapSeconds;
pub use moon::{moon_equatorial, moon_geocentric, MoonGeocentric};
pub use provider::{positions_over, AnalyticEphemeris, EphemerisProvider, SafeEphemeris};
pub use sun::{sun_equatorial, SunApparent};
pub use time::{greenwich_mean_sidereal_time, julian_centuries, julian_day};

pub use solys2tracker_core::{Body, Observer, Position};
