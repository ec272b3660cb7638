//! Lunar position from the principal terms of ELP-2000/82
//! (Meeus ch. 47) and the illuminated fraction (ch. 48).

use super::coords::{ecliptic_to_equatorial_angles, mean_obliquity, normalize_degrees};
use super::sun;
use super::time::JulianDate;

const AU_KM: f64 = 149_597_870.7;

/// Geocentric position of the Moon at one instant
#[derive(Debug, Clone, Copy)]
pub struct MoonPosition {
    /// Ecliptic longitude, mean equinox of date (degrees)
    pub longitude: f64,
    /// Ecliptic latitude (degrees)
    pub latitude: f64,
    /// Earth-Moon centre distance (km)
    pub distance_km: f64,
    /// Right ascension, equator of date (degrees)
    pub ra: f64,
    /// Declination, equator of date (degrees)
    pub dec: f64,
}

// Multipliers of D, M, M', F followed by the sine coefficient for longitude
// (1e-6 degree) and the cosine coefficient for distance (1e-3 km).
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

// Multipliers of D, M, M', F and the sine coefficient for latitude (1e-6 degree).
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

pub fn position(jd: &JulianDate) -> MoonPosition {
    position_at_centuries(jd.centuries_tt())
}

/// Moon position for `t` Julian centuries of TT since J2000.0.
pub fn position_at_centuries(t: f64) -> MoonPosition {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let mean_longitude = normalize_degrees(
        218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t2 + t3 / 538_841.0
            - t4 / 65_194_000.0,
    );
    let elongation = normalize_degrees(
        297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2 + t3 / 545_868.0
            - t4 / 113_065_000.0,
    );
    let sun_anomaly =
        normalize_degrees(357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2 + t3 / 24_490_000.0);
    let moon_anomaly = normalize_degrees(
        134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2 + t3 / 69_699.0
            - t4 / 14_712_000.0,
    );
    let latitude_arg = normalize_degrees(
        93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t2 - t3 / 3_526_000.0
            + t4 / 863_310_000.0,
    );

    let a1 = (119.75 + 131.849 * t).to_radians();
    let a2 = (53.09 + 479_264.290 * t).to_radians();
    let a3 = (313.45 + 481_266.484 * t).to_radians();
    let ecc = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;

    let (d, m, mp, f) = (
        elongation.to_radians(),
        sun_anomaly.to_radians(),
        moon_anomaly.to_radians(),
        latitude_arg.to_radians(),
    );
    let argument = |cd: i8, cm: i8, cmp: i8, cf: i8| {
        f64::from(cd) * d + f64::from(cm) * m + f64::from(cmp) * mp + f64::from(cf) * f
    };
    let eccentricity_factor = |cm: i8| ecc.powi(i32::from(cm.unsigned_abs()));

    let mut sum_l = 0.0;
    let mut sum_r = 0.0;
    for &(cd, cm, cmp, cf, coeff_l, coeff_r) in LONGITUDE_DISTANCE_TERMS.iter() {
        let arg = argument(cd, cm, cmp, cf);
        let factor = eccentricity_factor(cm);
        sum_l += coeff_l * factor * arg.sin();
        sum_r += coeff_r * factor * arg.cos();
    }

    let mut sum_b = 0.0;
    for &(cd, cm, cmp, cf, coeff_b) in LATITUDE_TERMS.iter() {
        sum_b += coeff_b * eccentricity_factor(cm) * argument(cd, cm, cmp, cf).sin();
    }

    let lp = mean_longitude.to_radians();
    sum_l += 3958.0 * a1.sin() + 1962.0 * (lp - f).sin() + 318.0 * a2.sin();
    sum_b += -2235.0 * lp.sin() + 382.0 * a3.sin() + 175.0 * (a1 - f).sin()
        + 175.0 * (a1 + f).sin()
        + 127.0 * (lp - mp).sin()
        - 115.0 * (lp + mp).sin();

    let longitude = normalize_degrees(mean_longitude + sum_l / 1_000_000.0);
    let latitude = sum_b / 1_000_000.0;
    let distance_km = 385_000.56 + sum_r / 1000.0;

    let (ra, dec) = ecliptic_to_equatorial_angles(longitude, latitude, mean_obliquity(t));

    MoonPosition {
        longitude,
        latitude,
        distance_km,
        ra,
        dec,
    }
}

/// Fraction of the lunar disk illuminated, in [0, 1].
pub fn fraction_illuminated(jd: &JulianDate) -> f64 {
    fraction_illuminated_at_centuries(jd.centuries_tt())
}

pub fn fraction_illuminated_at_centuries(t: f64) -> f64 {
    let moon = position_at_centuries(t);
    let sun = sun::position_at_centuries(t);
    illuminated_fraction(&moon, sun.apparent_longitude, sun.distance_au * AU_KM)
}

fn illuminated_fraction(moon: &MoonPosition, sun_longitude: f64, sun_distance_km: f64) -> f64 {
    let beta = moon.latitude.to_radians();
    let dlon = (moon.longitude - sun_longitude).to_radians();
    let cos_elongation = (beta.cos() * dlon.cos()).clamp(-1.0, 1.0);
    let elongation = cos_elongation.acos();

    let phase_angle = (sun_distance_km * elongation.sin())
        .atan2(moon.distance_km - sun_distance_km * cos_elongation);
    ((1.0 + phase_angle.cos()) / 2.0).clamp(0.0, 1.0)
}
