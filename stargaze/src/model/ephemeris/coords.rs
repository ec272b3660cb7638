//! Coordinate frames: rotations between ecliptic and equator, precession,
//! and spherical helpers. All public angles are in degrees.

use nalgebra::{Rotation3, Vector3};

/// Mean obliquity of the ecliptic at J2000.0, degrees
pub const OBLIQUITY_J2000: f64 = 23.439_291_111;

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Mean obliquity of the ecliptic (IAU 1980), `t` in Julian centuries TT.
pub fn mean_obliquity(t: f64) -> f64 {
    OBLIQUITY_J2000 - (46.8150 * t + 0.00059 * t * t - 0.001813 * t * t * t) / 3600.0
}

/// Unit vector (times `radius`) for a longitude/latitude pair.
pub fn spherical_to_vector(lon: f64, lat: f64, radius: f64) -> Vector3<f64> {
    let (lon, lat) = (lon.to_radians(), lat.to_radians());
    Vector3::new(
        radius * lat.cos() * lon.cos(),
        radius * lat.cos() * lon.sin(),
        radius * lat.sin(),
    )
}

/// Returns (longitude in [0, 360), latitude, radius).
pub fn vector_to_spherical(v: &Vector3<f64>) -> (f64, f64, f64) {
    let radius = v.norm();
    if radius == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let lat = (v.z / radius).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = normalize_degrees(v.y.atan2(v.x).to_degrees());
    (lon, lat, radius)
}

/// Rotation taking ecliptic vectors onto the equator for the given obliquity.
pub fn ecliptic_to_equatorial(obliquity: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity.to_radians())
}

/// (RA, Dec) of an ecliptic longitude/latitude.
pub fn ecliptic_to_equatorial_angles(lon: f64, lat: f64, obliquity: f64) -> (f64, f64) {
    let v = ecliptic_to_equatorial(obliquity) * spherical_to_vector(lon, lat, 1.0);
    let (ra, dec, _) = vector_to_spherical(&v);
    (ra, dec)
}

/// Precession matrix from the J2000 mean equator to the mean equator of
/// date, `t` in Julian centuries TT (IAU 1976 angles).
pub fn precession_matrix(t: f64) -> Rotation3<f64> {
    let arcsec = |x: f64| (x / 3600.0).to_radians();
    let zeta = arcsec(2306.2181 * t + 0.30188 * t * t + 0.017998 * t * t * t);
    let z = arcsec(2306.2181 * t + 1.09468 * t * t + 0.018203 * t * t * t);
    let theta = arcsec(2004.3109 * t - 0.42665 * t * t - 0.041833 * t * t * t);

    Rotation3::from_axis_angle(&Vector3::z_axis(), z)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), -theta)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), zeta)
}

/// Precess a J2000 (RA, Dec) to the equator of date.
pub fn precess_from_j2000(ra: f64, dec: f64, t: f64) -> (f64, f64) {
    let v = precession_matrix(t) * spherical_to_vector(ra, dec, 1.0);
    let (ra, dec, _) = vector_to_spherical(&v);
    (ra, dec)
}

/// Degrees from hours, minutes, seconds of right ascension.
pub fn hms_to_degrees(hours: f64, minutes: f64, seconds: f64) -> f64 {
    15.0 * (hours + minutes / 60.0 + seconds / 3600.0)
}

/// Degrees from a signed degree, arc-minute, arc-second triple.
/// The sign is taken from `degrees`.
pub fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    let magnitude = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    if degrees.is_sign_negative() { -magnitude } else { magnitude }
}
