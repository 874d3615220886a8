#![allow(clippy::uninlined_format_args)]
use std::io::Write;

use chrono::{DateTime, Duration, TimeZone, Utc};
use solys2tracker_ephem::{
    positions_over, AlmanacEphemeris, AnalyticEphemeris, Body, EphemerisProvider, Error,
    LeapSeconds, Observer, Position, Result, SafeEphemeris,
};

struct FailingProvider;

impl EphemerisProvider for FailingProvider {
    fn position(&self, _: Body, _: &Observer, _: DateTime<Utc>) -> Result<Position> {
        Err(Error::NonFinite("test"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn minute_grid(start: DateTime<Utc>, minutes: i64) -> Vec<DateTime<Utc>> {
    (0..minutes).map(|m| start + Duration::minutes(m)).collect()
}

fn min_zenith(positions: &[Result<Position>]) -> f64 {
    positions
        .iter()
        .map(|p| p.as_ref().unwrap().zenith)
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn test_sun_overhead_at_equinox_on_equator() {
    let provider = AnalyticEphemeris::default().with_refraction(false);
    let obs = Observer::new(0.0, 0.0, 0.0).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 3, 20, 11, 0, 0).unwrap();
    let positions = positions_over(&provider, Body::Sun, &obs, &minute_grid(start, 120));
    let z = min_zenith(&positions);
    assert!(z < 1.0, "minimum zenith {}", z);
}

#[test]
fn test_sun_noon_zenith_at_solstice() {
    let provider = AnalyticEphemeris::default().with_refraction(false);
    let obs = Observer::new(41.6628, -4.7055, 705.0).unwrap();
    let start = Utc.with_ymd_and_hms(2023, 6, 21, 11, 0, 0).unwrap();
    let positions = positions_over(&provider, Body::Sun, &obs, &minute_grid(start, 180));
    let z = min_zenith(&positions);
    // latitude minus obliquity
    assert!((z - (41.6628 - 23.438)).abs() < 0.1, "noon zenith {}", z);
}

#[test]
fn test_sun_rises_in_the_east() {
    let provider = AnalyticEphemeris::default();
    let obs = Observer::new(41.6628, -4.7055, 705.0).unwrap();
    let t = Utc.with_ymd_and_hms(2023, 3, 20, 8, 0, 0).unwrap();
    let p = provider.position(Body::Sun, &obs, t).unwrap();
    assert!(p.azimuth > 60.0 && p.azimuth < 120.0, "azimuth {}", p.azimuth);
    assert!(p.is_above_horizon());
}

#[test]
fn test_moon_position_is_sane() {
    let provider = AnalyticEphemeris::default();
    let obs = Observer::new(28.3, -16.5, 2390.0).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let times: Vec<_> = (0..48).map(|h| start + Duration::hours(h)).collect();
    let positions = positions_over(&provider, Body::Moon, &obs, &times);
    assert_eq!(positions.len(), 48);
    let mut above = 0;
    for p in &positions {
        let p = p.as_ref().unwrap();
        assert!((0.0..360.0).contains(&p.azimuth));
        assert!((0.0..=180.0).contains(&p.zenith));
        if p.is_above_horizon() {
            above += 1;
        }
    }
    // the Moon is up for roughly half of any two-day window
    assert!(above > 12 && above < 36, "above horizon {} hours", above);
}

#[test]
fn test_out_of_range_time() {
    let provider = AnalyticEphemeris::default();
    let obs = Observer::new(0.0, 0.0, 0.0).unwrap();
    let t = Utc.with_ymd_and_hms(3200, 1, 1, 0, 0, 0).unwrap();
    assert!(matches!(
        provider.position(Body::Sun, &obs, t),
        Err(Error::TimeOutOfRange(_))
    ));
}

#[test]
fn test_safe_ephemeris_falls_back() {
    let obs = Observer::new(41.6628, -4.7055, 705.0).unwrap();
    let t = Utc.with_ymd_and_hms(2023, 6, 21, 12, 0, 0).unwrap();

    let safe = SafeEphemeris::new(FailingProvider, AnalyticEphemeris::default());
    let expected = AnalyticEphemeris::default()
        .position(Body::Sun, &obs, t)
        .unwrap();
    let got = safe.position(Body::Sun, &obs, t).unwrap();
    assert_eq!(got, expected);
    assert_eq!(safe.name(), "failing");

    let both_fail = SafeEphemeris::new(FailingProvider, FailingProvider);
    assert!(both_fail.position(Body::Sun, &obs, t).is_err());
}

#[test]
fn test_almanac_answers_outside_series_window() {
    let obs = Observer::new(41.6628, -4.7055, 705.0).unwrap();
    let t = Utc.with_ymd_and_hms(3200, 6, 21, 12, 0, 0).unwrap();
    let primary = AnalyticEphemeris::default();
    assert!(primary.position(Body::Sun, &obs, t).is_err());

    let safe = SafeEphemeris::new(primary, AlmanacEphemeris::default());
    let sun = safe.position(Body::Sun, &obs, t).unwrap();
    assert!(sun.is_above_horizon(), "zenith {}", sun.zenith);
    assert!(safe.position(Body::Moon, &obs, t).is_ok());

    let far = Utc.with_ymd_and_hms(6000, 1, 1, 0, 0, 0).unwrap();
    assert!(matches!(
        safe.position(Body::Sun, &obs, far),
        Err(Error::TimeOutOfRange(_))
    ));
}

#[test]
fn test_almanac_tracks_full_series_today() {
    let obs = Observer::new(28.3, -16.5, 2390.0).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
    let times: Vec<_> = (0..24).map(|h| start + Duration::hours(h)).collect();
    let full = AnalyticEphemeris::default();
    let low = AlmanacEphemeris::default();
    for (body, tolerance) in [(Body::Sun, 0.05), (Body::Moon, 1.0)] {
        let a = positions_over(&full, body, &obs, &times);
        let b = positions_over(&low, body, &obs, &times);
        for (a, b) in a.iter().zip(&b) {
            let (a, b) = (a.as_ref().unwrap(), b.as_ref().unwrap());
            assert!((a.zenith - b.zenith).abs() < tolerance, "{} zenith", body);
            if (30.0..80.0).contains(&a.zenith) {
                let d_az = (a.azimuth - b.azimuth + 540.0).rem_euclid(360.0) - 180.0;
                assert!(d_az.abs() < 2.0 * tolerance, "{} azimuth {}", body, d_az);
            }
        }
    }
}

#[test]
fn test_kernel_leap_seconds_shift_positions() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "KPL/LSK\n\\begindata\nDELTET/DELTA_T_A = 32.184\nDELTET/DELTA_AT = ( 10, @1972-JAN-1\n 37, @2017-JAN-1 )\n\\begintext\n"
    )
    .unwrap();
    let table = LeapSeconds::from_file(file.path()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.source(), file.path().display().to_string());

    let kernel = AnalyticEphemeris::new(table);
    let builtin = AnalyticEphemeris::default();
    assert!(kernel.name().contains("analytic"));

    let obs = Observer::new(41.6628, -4.7055, 705.0).unwrap();
    let t = Utc.with_ymd_and_hms(2024, 6, 21, 10, 0, 0).unwrap();
    // same ΔAT today: identical positions
    let a = kernel.position(Body::Moon, &obs, t).unwrap();
    let b = builtin.position(Body::Moon, &obs, t).unwrap();
    assert!((a.azimuth - b.azimuth).abs() < 1e-9);
}
