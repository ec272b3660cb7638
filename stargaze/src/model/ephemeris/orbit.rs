//! Two-body heliocentric orbits for comets.
//!
//! Positions come from a universal-variable formulation of Kepler's
//! equation, so elliptic, parabolic and hyperbolic orbits share one solver.
//! Elements are referred to the J2000 ecliptic and equinox, as published by
//! the Minor Planet Center.

use nalgebra::{Rotation3, Vector3};

use super::coords::{ecliptic_to_equatorial, precess_from_j2000, vector_to_spherical, OBLIQUITY_J2000};
use super::sun;
use super::time::JulianDate;
use crate::error::{Result, StargazeError};

/// Gaussian gravitational constant (AU^1.5 / day)
pub const GAUSS_K: f64 = 0.017_202_098_95;
/// Speed of light in AU per day
pub const LIGHT_AU_PER_DAY: f64 = 173.144_632_674;

const MAX_ITERATIONS: usize = 200;

/// Keplerian orbit about the Sun, defined by its perihelion passage
#[derive(Debug, Clone)]
pub struct CometOrbit {
    /// Perihelion distance (AU)
    pub perihelion_distance: f64,
    pub eccentricity: f64,
    /// Perihelion time, TT Julian date
    pub perihelion_tt: f64,
    /// Orbital plane to J2000 equatorial frame
    to_equatorial: Rotation3<f64>,
}

impl CometOrbit {
    /// Angles in degrees: inclination, longitude of the ascending node,
    /// argument of perihelion.
    pub fn new(
        perihelion_distance: f64,
        eccentricity: f64,
        inclination: f64,
        ascending_node: f64,
        argument_of_perihelion: f64,
        perihelion_tt: f64,
    ) -> Result<Self> {
        let values = [
            perihelion_distance,
            eccentricity,
            inclination,
            ascending_node,
            argument_of_perihelion,
            perihelion_tt,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StargazeError::InvalidElements("non-finite element".to_string()));
        }
        if perihelion_distance <= 0.0 {
            return Err(StargazeError::InvalidElements(format!(
                "perihelion distance must be positive, got {}",
                perihelion_distance
            )));
        }
        if eccentricity < 0.0 {
            return Err(StargazeError::InvalidElements(format!(
                "negative eccentricity {}",
                eccentricity
            )));
        }

        let to_ecliptic = Rotation3::from_axis_angle(&Vector3::z_axis(), ascending_node.to_radians())
            * Rotation3::from_axis_angle(&Vector3::x_axis(), inclination.to_radians())
            * Rotation3::from_axis_angle(&Vector3::z_axis(), argument_of_perihelion.to_radians());

        Ok(Self {
            perihelion_distance,
            eccentricity,
            perihelion_tt,
            to_equatorial: ecliptic_to_equatorial(OBLIQUITY_J2000) * to_ecliptic,
        })
    }

    /// Heliocentric position, J2000 equatorial (AU), at a TT Julian date.
    pub fn heliocentric_position(&self, jd_tt: f64) -> Result<Vector3<f64>> {
        let (x, y) = self.orbital_plane_position(jd_tt - self.perihelion_tt)?;
        Ok(self.to_equatorial * Vector3::new(x, y, 0.0))
    }

    /// Position in the orbital plane (x towards perihelion), `dt` days after
    /// perihelion passage.
    pub fn orbital_plane_position(&self, dt: f64) -> Result<(f64, f64)> {
        let q = self.perihelion_distance;
        let e = self.eccentricity;
        let alpha = (1.0 - e) / q;

        let mut dt = dt;
        if alpha > 0.0 {
            let period = std::f64::consts::TAU / (GAUSS_K * alpha.powf(1.5));
            dt -= period * (dt / period).round();
        }
        if dt == 0.0 {
            return Ok((q, 0.0));
        }

        // The orbit is symmetric about the apse line: solve for |dt| and mirror.
        let sign = dt.signum();
        let tau = dt.abs();
        let target = GAUSS_K * tau;

        let chi = solve_universal_anomaly(q, e, alpha, target).ok_or(
            StargazeError::NoConvergence {
                iterations: MAX_ITERATIONS,
                dt_days: dt,
            },
        )?;

        let z = alpha * chi * chi;
        let (c, s) = stumpff(z);
        let f = 1.0 - chi * chi * c / q;
        let g = tau - chi.powi(3) * s / GAUSS_K;
        let v0 = GAUSS_K * ((1.0 + e) / q).sqrt();

        Ok((f * q, sign * g * v0))
    }
}

/// Solve e·χ³·S(αχ²) + q·χ = target for χ. The left side is strictly
/// increasing in χ, so Newton steps are kept inside a shrinking bracket.
fn solve_universal_anomaly(q: f64, e: f64, alpha: f64, target: f64) -> Option<f64> {
    let time_of = |chi: f64| {
        let z = alpha * chi * chi;
        let (c, s) = stumpff(z);
        let value = e * chi.powi(3) * s + q * chi - target;
        let slope = e * chi * chi * c + q;
        (value, slope)
    };

    let mut lo = 0.0;
    let mut hi = target / q;
    let mut chi = if e > 0.0 {
        hi.min((6.0 * target / e).cbrt())
    } else {
        hi
    };

    for _ in 0..MAX_ITERATIONS {
        let (value, slope) = time_of(chi);
        if value.abs() <= 1e-15 * target.max(1e-12) {
            return Some(chi);
        }
        if value < 0.0 {
            lo = chi;
        } else {
            hi = chi;
        }

        let newton = chi - value / slope;
        let next = if newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        if (next - chi).abs() <= 1e-13 * chi.abs().max(1e-12) || hi - lo <= 1e-15 * hi {
            return Some(next);
        }
        chi = next;
    }
    None
}

/// Stumpff functions C(z) and S(z).
fn stumpff(z: f64) -> (f64, f64) {
    if z.abs() < 1e-4 {
        let c = 0.5 - z / 24.0 + z * z / 720.0 - z * z * z / 40_320.0;
        let s = 1.0 / 6.0 - z / 120.0 + z * z / 5040.0 - z * z * z / 362_880.0;
        (c, s)
    } else if z > 0.0 {
        let root = z.sqrt();
        ((1.0 - root.cos()) / z, (root - root.sin()) / root.powi(3))
    } else {
        let root = (-z).sqrt();
        ((root.cosh() - 1.0) / -z, (root.sinh() - root) / root.powi(3))
    }
}

/// A comet as seen from the geocentre
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    /// Astrometric right ascension, J2000 (degrees)
    pub ra_j2000: f64,
    /// Astrometric declination, J2000 (degrees)
    pub dec_j2000: f64,
    /// Geocentric distance Δ (AU)
    pub earth_distance: f64,
    /// Heliocentric distance r (AU)
    pub sun_distance: f64,
    /// Julian centuries TT of the observation, for precession
    centuries_tt: f64,
}

impl Observation {
    /// Right ascension and declination referred to the equator of date.
    pub fn ra_dec_of_date(&self) -> (f64, f64) {
        precess_from_j2000(self.ra_j2000, self.dec_j2000, self.centuries_tt)
    }
}

/// Observe a comet from the Earth's centre, correcting for light time.
pub fn observe(orbit: &CometOrbit, jd: &JulianDate) -> Result<Observation> {
    let earth = sun::position(jd).earth_heliocentric_j2000();
    let tt = jd.tt();

    let mut heliocentric = orbit.heliocentric_position(tt)?;
    let light_time = (heliocentric - earth).norm() / LIGHT_AU_PER_DAY;
    heliocentric = orbit.heliocentric_position(tt - light_time)?;

    let geocentric = heliocentric - earth;
    let (ra, dec, earth_distance) = vector_to_spherical(&geocentric);

    Ok(Observation {
        ra_j2000: ra,
        dec_j2000: dec,
        earth_distance,
        sun_distance: heliocentric.norm(),
        centuries_tt: jd.centuries_tt(),
    })
}
