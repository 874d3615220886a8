//! Geocentric position of the Moon (Meeus, chapter 47).
//!
//! The periodic series is truncated to its largest terms, which keeps the
//! error around 0.01° in longitude and a few tens of kilometres in distance.

use crate::coords::Equatorial;
use crate::time::julian_centuries;

/// Longitude and distance terms: multipliers of D, M, M', F, then
/// Σl (1e-6 deg) and Σr (1e-3 km).
const LONGITUDE_DISTANCE_TERMS: [(i8, i8, i8, i8, f64, f64); 32] = [
    (0, 0, 1, 0, 6_288_774.0, -20_905_355.0),
    (2, 0, -1, 0, 1_274_027.0, -3_699_111.0),
    (2, 0, 0, 0, 658_314.0, -2_955_968.0),
    (0, 0, 2, 0, 213_618.0, -569_925.0),
    (0, 1, 0, 0, -185_116.0, 48_888.0),
    (0, 0, 0, 2, -114_332.0, -3_149.0),
    (2, 0, -2, 0, 58_793.0, 246_158.0),
    (2, -1, -1, 0, 57_066.0, -152_138.0),
    (2, 0, 1, 0, 53_322.0, -170_733.0),
    (2, -1, 0, 0, 45_758.0, -204_586.0),
    (0, 1, -1, 0, -40_923.0, -129_620.0),
    (1, 0, 0, 0, -34_720.0, 108_743.0),
    (0, 1, 1, 0, -30_383.0, 104_755.0),
    (2, 0, 0, -2, 15_327.0, 10_321.0),
    (0, 0, 1, 2, -12_528.0, 0.0),
    (0, 0, 1, -2, 10_980.0, 79_661.0),
    (4, 0, -1, 0, 10_675.0, -34_782.0),
    (0, 0, 3, 0, 10_034.0, -23_210.0),
    (4, 0, -2, 0, 8_548.0, -21_636.0),
    (2, 1, -1, 0, -7_888.0, 24_208.0),
    (2, 1, 0, 0, -6_766.0, 30_824.0),
    (1, 0, -1, 0, -5_163.0, -8_379.0),
    (1, 1, 0, 0, 4_987.0, -16_675.0),
    (2, -1, 1, 0, 4_036.0, -12_831.0),
    (2, 0, 2, 0, 3_994.0, -10_445.0),
    (4, 0, 0, 0, 3_861.0, -11_650.0),
    (2, 0, -3, 0, 3_665.0, 14_403.0),
    (0, 1, -2, 0, -2_689.0, -7_003.0),
    (2, 0, -1, 2, -2_602.0, 0.0),
    (2, -1, -2, 0, 2_390.0, 10_056.0),
    (1, 0, 1, 0, -2_348.0, 6_322.0),
    (2, -2, 0, 0, 2_236.0, -9_884.0),
];

/// Latitude terms: multipliers of D, M, M', F, then Σb (1e-6 deg).
const LATITUDE_TERMS: [(i8, i8, i8, i8, f64); 20] = [
    (0, 0, 0, 1, 5_128_122.0),
    (0, 0, 1, 1, 280_602.0),
    (0, 0, 1, -1, 277_693.0),
    (2, 0, 0, -1, 173_237.0),
    (2, 0, -1, 1, 55_413.0),
    (2, 0, -1, -1, 46_271.0),
    (2, 0, 0, 1, 32_573.0),
    (0, 0, 2, 1, 17_198.0),
    (2, 0, 1, -1, 9_266.0),
    (0, 0, 2, -1, 8_822.0),
    (2, -1, 0, -1, 8_216.0),
    (2, 0, -2, -1, 4_324.0),
    (2, 0, 1, 1, 4_200.0),
    (2, 1, 0, -1, -3_359.0),
    (2, -1, -1, 1, 2_463.0),
    (2, -1, 0, 1, 2_211.0),
    (2, -1, -1, -1, 2_065.0),
    (0, 1, -1, -1, -1_870.0),
    (4, 0, -1, -1, 1_828.0),
    (0, 1, 0, 1, -1_794.0),
];

/// Geocentric ecliptic coordinates of the Moon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonGeocentric {
    /// Apparent ecliptic longitude in degrees (nutation included).
    pub longitude: f64,
    /// Ecliptic latitude in degrees.
    pub latitude: f64,
    /// Earth-Moon centre distance in kilometres.
    pub distance_km: f64,
    /// True obliquity of the ecliptic in degrees.
    pub obliquity: f64,
}

/// Eccentricity factor applied to terms involving the solar anomaly.
#[inline]
fn eccentricity_factor(m: i8, e: f64) -> f64 {
    match m.unsigned_abs() {
        1 => e,
        2 => e * e,
        _ => 1.0,
    }
}

/// Computes the Moon's apparent geocentric ecliptic position for a TT Julian day.
#[must_use]
pub fn moon_geocentric(jd_tt: f64) -> MoonGeocentric {
    let t = julian_centuries(jd_tt);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let lp = 218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t2 + t3 / 538_841.0
        - t4 / 65_194_000.0;
    let d = 297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2 + t3 / 545_868.0
        - t4 / 113_065_000.0;
    let m = 357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2 + t3 / 24_490_000.0;
    let mp = 134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2 + t3 / 69_699.0
        - t4 / 14_712_000.0;
    let f = 93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t2 - t3 / 3_526_000.0
        + t4 / 863_310_000.0;
    let a1 = 119.75 + 131.849 * t;
    let a2 = 53.09 + 479_264.290 * t;
    let a3 = 313.45 + 481_266.484 * t;
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;

    let arg = |cd: i8, cm: i8, cmp: i8, cf: i8| {
        (f64::from(cd) * d + f64::from(cm) * m + f64::from(cmp) * mp + f64::from(cf) * f)
            .to_radians()
    };

    let mut sum_l = 0.0;
    let mut sum_r = 0.0;
    for &(cd, cm, cmp, cf, l, r) in &LONGITUDE_DISTANCE_TERMS {
        let x = arg(cd, cm, cmp, cf);
        let k = eccentricity_factor(cm, e);
        sum_l += l * k * x.sin();
        sum_r += r * k * x.cos();
    }

    let mut sum_b = 0.0;
    for &(cd, cm, cmp, cf, b) in &LATITUDE_TERMS {
        sum_b += b * eccentricity_factor(cm, e) * arg(cd, cm, cmp, cf).sin();
    }

    let rad = f64::to_radians;
    sum_l += 3_958.0 * rad(a1).sin() + 1_962.0 * rad(lp - f).sin() + 318.0 * rad(a2).sin();
    sum_b += -2_235.0 * rad(lp).sin()
        + 382.0 * rad(a3).sin()
        + 175.0 * rad(a1 - f).sin()
        + 175.0 * rad(a1 + f).sin()
        + 127.0 * rad(lp - mp).sin()
        - 115.0 * rad(lp + mp).sin();

    // Nutation, main terms (chapter 22)
    let omega = rad(125.044_52 - 1_934.136_261 * t);
    let l_sun = rad(280.466_5 + 36_000.769_8 * t);
    let l_moon = rad(lp);
    let dpsi = (-17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin() - 0.23 * (2.0 * l_moon).sin()
        + 0.21 * (2.0 * omega).sin())
        / 3600.0;
    let deps = (9.20 * omega.cos() + 0.57 * (2.0 * l_sun).cos() + 0.10 * (2.0 * l_moon).cos()
        - 0.09 * (2.0 * omega).cos())
        / 3600.0;
    let eps0 = 23.0 + 26.0 / 60.0 + 21.448 / 3600.0
        - (46.815_0 * t + 0.000_59 * t2 - 0.001_813 * t3) / 3600.0;

    MoonGeocentric {
        longitude: (lp + sum_l / 1e6 + dpsi).rem_euclid(360.0),
        latitude: sum_b / 1e6,
        distance_km: 385_000.56 + sum_r / 1_000.0,
        obliquity: eps0 + deps,
    }
}

/// Apparent geocentric right ascension and declination of the Moon.
#[must_use]
pub fn moon_equatorial(jd_tt: f64) -> Equatorial {
    let moon = moon_geocentric(jd_tt);
    let lambda = moon.longitude.to_radians();
    let beta = moon.latitude.to_radians();
    let eps = moon.obliquity.to_radians();
    let ra = (lambda.sin() * eps.cos() - beta.tan() * eps.sin())
        .atan2(lambda.cos())
        .to_degrees();
    let dec = (beta.sin() * eps.cos() + beta.cos() * eps.sin() * lambda.sin())
        .asin()
        .to_degrees();
    Equatorial {
        right_ascension: ra.rem_euclid(360.0),
        declination: dec,
        distance_km: moon.distance_km,
    }
}
