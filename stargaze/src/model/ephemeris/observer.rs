//! Topocentric horizontal coordinates for a ground observer

use serde::{Deserialize, Serialize};

use super::coords::normalize_degrees;
use super::time::{greenwich_mean_sidereal_time, JulianDate};

const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.14;

/// Altitude and azimuth, degrees. Azimuth runs from north through east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub altitude: f64,
    pub azimuth: f64,
}

/// A fixed observing site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Geodetic latitude, north positive (degrees)
    pub latitude: f64,
    /// Longitude, east positive (degrees)
    pub longitude: f64,
    /// Height above sea level, scales the diurnal parallax
    #[serde(default)]
    pub elevation_m: f64,
    /// Apply atmospheric refraction to altitudes
    #[serde(default = "default_refraction")]
    pub refraction: bool,
}

fn default_refraction() -> bool {
    true
}

impl Observer {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m: 0.0,
            refraction: true,
        }
    }

    /// Local mean sidereal time, degrees
    pub fn local_sidereal_time(&self, jd: &JulianDate) -> f64 {
        normalize_degrees(greenwich_mean_sidereal_time(jd) + self.longitude)
    }

    /// Horizontal position of a body at infinite distance (stars, comets,
    /// and the Sun, whose parallax is negligible here).
    pub fn horizontal(&self, ra: f64, dec: f64, jd: &JulianDate) -> Horizontal {
        let geometric = self.geometric_horizontal(ra, dec, jd);
        self.finish(geometric.altitude, geometric.azimuth)
    }

    /// Distance from the Earth's centre in equatorial radii.
    pub fn geocentric_radius(&self) -> f64 {
        1.0 + self.elevation_m / 1000.0 / EARTH_EQUATORIAL_RADIUS_KM
    }

    /// Horizontal position of a nearby body, corrected for diurnal parallax.
    pub fn horizontal_at_distance(
        &self,
        ra: f64,
        dec: f64,
        distance_km: f64,
        jd: &JulianDate,
    ) -> Horizontal {
        let geometric = self.geometric_horizontal(ra, dec, jd);
        let baseline = self.geocentric_radius() * EARTH_EQUATORIAL_RADIUS_KM;
        let parallax = (baseline / distance_km).clamp(-1.0, 1.0).asin();
        let shift = (parallax * geometric.altitude.to_radians().cos()).to_degrees();
        self.finish(geometric.altitude - shift, geometric.azimuth)
    }

    fn geometric_horizontal(&self, ra: f64, dec: f64, jd: &JulianDate) -> Horizontal {
        let hour_angle = (self.local_sidereal_time(jd) - ra).to_radians();
        let (dec, lat) = (dec.to_radians(), self.latitude.to_radians());

        let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
        let altitude = sin_alt.clamp(-1.0, 1.0).asin().to_degrees();

        let y = -dec.cos() * hour_angle.sin();
        let x = dec.sin() * lat.cos() - dec.cos() * lat.sin() * hour_angle.cos();
        let azimuth = normalize_degrees(y.atan2(x).to_degrees());

        Horizontal { altitude, azimuth }
    }

    fn finish(&self, altitude: f64, azimuth: f64) -> Horizontal {
        let altitude = if self.refraction {
            altitude + refraction_degrees(altitude)
        } else {
            altitude
        };
        Horizontal { altitude, azimuth }
    }
}

/// Saemundsson's refraction for a true altitude in degrees, at 10 °C and
/// 1010 hPa. Zero below -1 degree.
pub fn refraction_degrees(true_altitude: f64) -> f64 {
    if true_altitude < -1.0 {
        return 0.0;
    }
    let h = true_altitude.min(90.0);
    let arcmin = 1.02 / (h + 10.3 / (h + 5.11)).to_radians().tan();
    (arcmin / 60.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zenith_when_ra_equals_lst() {
        let observer = Observer {
            refraction: false,
            ..Observer::new(18.5558, 98.4822)
        };
        let jd = JulianDate::new(2_461_056.0);
        let lst = observer.local_sidereal_time(&jd);
        let h = observer.horizontal(lst, observer.latitude, &jd);
        assert_abs_diff_eq!(h.altitude, 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_meridian_azimuths() {
        let observer = Observer {
            refraction: false,
            ..Observer::new(14.439, 101.3725)
        };
        let jd = JulianDate::new(2_461_200.25);
        let lst = observer.local_sidereal_time(&jd);

        // On the meridian south of the zenith: azimuth 180, altitude 90 - |lat - dec|
        let south = observer.horizontal(lst, -29.0, &jd);
        assert_abs_diff_eq!(south.azimuth, 180.0, epsilon = 1e-6);
        assert_abs_diff_eq!(south.altitude, 90.0 - (14.439 + 29.0), epsilon = 1e-6);

        // East of the meridian (hour angle -90°) the body is rising: azimuth < 180
        let east = observer.horizontal(lst + 90.0, 0.0, &jd);
        assert!(east.azimuth > 0.0 && east.azimuth < 180.0);
        assert_abs_diff_eq!(east.altitude, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_refraction_values() {
        // About 29 arc-minutes at the horizon, about 1 arc-minute at 45°
        assert_abs_diff_eq!(refraction_degrees(0.0), 0.483, epsilon = 0.005);
        assert_abs_diff_eq!(refraction_degrees(45.0) * 60.0, 1.0, epsilon = 0.05);
        assert_eq!(refraction_degrees(-5.0), 0.0);
    }

    #[test]
    fn test_parallax_lowers_moon() {
        let observer = Observer {
            refraction: false,
            ..Observer::new(0.0, 0.0)
        };
        let jd = JulianDate::new(2_461_100.5);
        let lst = observer.local_sidereal_time(&jd);
        let far = observer.horizontal(lst + 60.0, 0.0, &jd);
        let near = observer.horizontal_at_distance(lst + 60.0, 0.0, 384_400.0, &jd);
        let drop = far.altitude - near.altitude;
        // Horizontal parallax is ~0.95°, scaled by cos(altitude = 30°)
        assert_abs_diff_eq!(drop, 0.951 * 30f64.to_radians().cos(), epsilon = 0.01);
    }

    #[test]
    fn test_elevation_enlarges_parallax() {
        let sea_level = Observer {
            refraction: false,
            ..Observer::new(14.439, 101.3725)
        };
        let summit = Observer {
            elevation_m: 2565.0,
            ..sea_level.clone()
        };
        assert_abs_diff_eq!(summit.geocentric_radius(), 1.000_402, epsilon = 1e-6);

        let jd = JulianDate::new(2_461_100.5);
        let lst = sea_level.local_sidereal_time(&jd);
        let low = sea_level.horizontal_at_distance(lst + 60.0, 0.0, 384_400.0, &jd);
        let high = summit.horizontal_at_distance(lst + 60.0, 0.0, 384_400.0, &jd);
        assert!(high.altitude < low.altitude);
        assert_abs_diff_eq!(low.altitude - high.altitude, 0.951 * 0.000_402 * 0.866, epsilon = 1e-4);
        assert_eq!(sea_level.geocentric_radius(), 1.0);
    }
}
