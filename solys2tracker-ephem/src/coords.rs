//! Equatorial to horizontal coordinate conversion with topocentric parallax.

use solys2tracker_core::{Observer, Position};

/// Astronomical unit in kilometres.
pub const AU_KM: f64 = 149_597_870.7;
/// Equatorial Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_378.14;
/// Polar to equatorial radius ratio.
const EARTH_AXIS_RATIO: f64 = 0.996_647_19;

/// Geocentric equatorial coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    /// Right ascension in degrees.
    pub right_ascension: f64,
    /// Declination in degrees.
    pub declination: f64,
    /// Distance from the Earth centre in kilometres.
    pub distance_km: f64,
}

/// Atmospheric refraction in degrees for a true elevation `h` (degrees),
/// at 1010 hPa and 10 °C (Sæmundsson).
///
/// Returns zero well below the horizon, where the formula diverges.
#[must_use]
pub fn refraction_correction(h: f64) -> f64 {
    if h < -1.0 {
        return 0.0;
    }
    let arcmin = 1.02 / (h + 10.3 / (h + 5.11)).to_radians().tan();
    arcmin.max(0.0) / 60.0
}

/// Converts geocentric equatorial coordinates into the topocentric
/// horizontal position seen by `observer`.
///
/// `lst` is the local sidereal time in degrees. When `refraction` is set
/// the returned zenith is the apparent one.
#[must_use]
pub fn equatorial_to_horizontal(
    eq: &Equatorial,
    observer: &Observer,
    lst: f64,
    refraction: bool,
) -> Position {
    let phi = observer.latitude.to_radians();

    // Observer geocentric coordinates (Meeus chapter 11)
    let u = (EARTH_AXIS_RATIO * phi.tan()).atan();
    let h_ratio = observer.height / (EARTH_RADIUS_KM * 1000.0);
    let rho_sin = EARTH_AXIS_RATIO * u.sin() + h_ratio * phi.sin();
    let rho_cos = u.cos() + h_ratio * phi.cos();

    let sin_pi = EARTH_RADIUS_KM / eq.distance_km;
    let ha = (lst - eq.right_ascension).to_radians();
    let dec = eq.declination.to_radians();

    // Topocentric correction (Meeus chapter 40)
    let denom = dec.cos() - rho_cos * sin_pi * ha.cos();
    let d_alpha = (-rho_cos * sin_pi * ha.sin()).atan2(denom);
    let dec_topo = ((dec.sin() - rho_sin * sin_pi) * d_alpha.cos()).atan2(denom);
    let ha_topo = ha - d_alpha;

    let sin_alt = phi.sin() * dec_topo.sin() + phi.cos() * dec_topo.cos() * ha_topo.cos();
    let mut elevation = sin_alt.clamp(-1.0, 1.0).asin().to_degrees();
    let azimuth = (-ha_topo.sin() * dec_topo.cos())
        .atan2(dec_topo.sin() * phi.cos() - dec_topo.cos() * ha_topo.cos() * phi.sin())
        .to_degrees();

    if refraction {
        elevation += refraction_correction(elevation);
    }

    Position::new(azimuth, 90.0 - elevation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn far(ra: f64, dec: f64) -> Equatorial {
        Equatorial {
            right_ascension: ra,
            declination: dec,
            distance_km: f64::INFINITY,
        }
    }

    #[test]
    fn test_transit_at_equator() {
        let obs = Observer::new(0.0, 0.0, 0.0).unwrap();
        let p = equatorial_to_horizontal(&far(100.0, 0.0), &obs, 100.0, false);
        assert_relative_eq!(p.zenith, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_azimuth_convention() {
        let obs = Observer::new(40.0, 0.0, 0.0).unwrap();
        // Object one hour east of the meridian is in the south-east half
        let east = equatorial_to_horizontal(&far(15.0, 0.0), &obs, 0.0, false);
        assert!(east.azimuth > 90.0 && east.azimuth < 180.0);
        // one hour west: south-west
        let west = equatorial_to_horizontal(&far(345.0, 0.0), &obs, 0.0, false);
        assert!(west.azimuth > 180.0 && west.azimuth < 270.0);
        // on the meridian, declination 0: due south at zenith = latitude
        let south = equatorial_to_horizontal(&far(0.0, 0.0), &obs, 0.0, false);
        assert_relative_eq!(south.azimuth, 180.0, epsilon = 1e-9);
        assert_relative_eq!(south.zenith, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_refraction() {
        // about 29 arcmin at the horizon, negligible near the zenith
        assert_relative_eq!(refraction_correction(0.0), 0.48, epsilon = 0.02);
        assert!(refraction_correction(89.0) < 0.001);
        assert_relative_eq!(refraction_correction(-5.0), 0.0);
    }

    #[test]
    fn test_lunar_parallax_lowers_the_moon() {
        let obs = Observer::new(40.0, 0.0, 0.0).unwrap();
        let moon = Equatorial {
            right_ascension: 30.0,
            declination: 10.0,
            distance_km: 384_400.0,
        };
        let topo = equatorial_to_horizontal(&moon, &obs, 0.0, false);
        let geo = equatorial_to_horizontal(&far(30.0, 10.0), &obs, 0.0, false);
        let dz = topo.zenith - geo.zenith;
        // horizontal parallax ~0.95 deg scaled by sin(zenith)
        assert!(dz > 0.3 && dz < 1.0, "dz = {dz}");
    }
}
