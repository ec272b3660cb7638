//! Compact ephemeris for observation planning
//!
//! Analytic low-precision Sun and Moon theories, precession, sidereal time
//! and horizontal coordinates, plus two-body orbits for comets. Accuracy is
//! at the arc-minute level, which is what twilight and altitude cut-offs need.

pub mod coords;
pub mod moon;
pub mod observer;
pub mod orbit;
pub mod sun;
pub mod time;

pub use coords::{dms_to_degrees, hms_to_degrees, precess_from_j2000};
pub use observer::{Horizontal, Observer};
pub use orbit::{observe, CometOrbit, Observation};
pub use time::JulianDate;

/// Apparent altitude/azimuth of the Sun for an observer.
pub fn sun_horizontal(observer: &Observer, jd: &JulianDate) -> Horizontal {
    let sun = sun::position(jd);
    observer.horizontal(sun.ra, sun.dec, jd)
}

/// Apparent (topocentric) altitude/azimuth of the Moon for an observer.
pub fn moon_horizontal(observer: &Observer, jd: &JulianDate) -> Horizontal {
    let moon = moon::position(jd);
    observer.horizontal_at_distance(moon.ra, moon.dec, moon.distance_km, jd)
}

/// Apparent altitude/azimuth of a fixed J2000 direction (a star).
pub fn star_horizontal(observer: &Observer, ra_j2000: f64, dec_j2000: f64, jd: &JulianDate) -> Horizontal {
    let (ra, dec) = precess_from_j2000(ra_j2000, dec_j2000, jd.centuries_tt());
    observer.horizontal(ra, dec, jd)
}
