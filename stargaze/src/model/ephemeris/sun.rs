//! Low-accuracy solar coordinates (Meeus, Astronomical Algorithms ch. 25).
//! Good to about 0.01 degree, which is plenty for twilight tests.

use nalgebra::Vector3;

use super::coords::{
    ecliptic_to_equatorial, ecliptic_to_equatorial_angles, mean_obliquity, normalize_degrees,
    spherical_to_vector, OBLIQUITY_J2000,
};
use super::time::JulianDate;

/// Geocentric position of the Sun at one instant
#[derive(Debug, Clone, Copy)]
pub struct SunPosition {
    /// Apparent right ascension, equator of date (degrees)
    pub ra: f64,
    /// Apparent declination, equator of date (degrees)
    pub dec: f64,
    /// Sun-Earth distance (AU)
    pub distance_au: f64,
    /// Apparent ecliptic longitude of date (degrees)
    pub apparent_longitude: f64,
    /// Geometric ecliptic longitude referred to the J2000 equinox (degrees)
    pub longitude_j2000: f64,
}

impl SunPosition {
    /// Heliocentric position of the Earth, J2000 equatorial frame (AU).
    pub fn earth_heliocentric_j2000(&self) -> Vector3<f64> {
        let sun_ecliptic = spherical_to_vector(self.longitude_j2000, 0.0, self.distance_au);
        -(ecliptic_to_equatorial(OBLIQUITY_J2000) * sun_ecliptic)
    }
}

pub fn position(jd: &JulianDate) -> SunPosition {
    position_at_centuries(jd.centuries_tt())
}

/// Sun position for `t` Julian centuries of TT since J2000.0.
pub fn position_at_centuries(t: f64) -> SunPosition {
    let l0 = normalize_degrees(280.46646 + 36000.76983 * t + 0.0003032 * t * t);
    let m = 357.52911 + 35999.05029 * t - 0.0001537 * t * t;
    let e = 0.016708634 - 0.000042037 * t - 0.0000001267 * t * t;
    let m_rad = m.to_radians();

    let center = (1.914602 - 0.004817 * t - 0.000014 * t * t) * m_rad.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * m_rad).sin()
        + 0.000289 * (3.0 * m_rad).sin();

    let true_longitude = l0 + center;
    let true_anomaly = (m + center).to_radians();
    let distance_au = 1.000001018 * (1.0 - e * e) / (1.0 + e * true_anomaly.cos());

    let omega = (125.04 - 1934.136 * t).to_radians();
    let apparent_longitude = normalize_degrees(true_longitude - 0.00569 - 0.00478 * omega.sin());
    let obliquity = mean_obliquity(t) + 0.00256 * omega.cos();

    let (ra, dec) = ecliptic_to_equatorial_angles(apparent_longitude, 0.0, obliquity);

    SunPosition {
        ra,
        dec,
        distance_au,
        apparent_longitude,
        longitude_j2000: normalize_degrees(true_longitude - 1.397 * t),
    }
}
