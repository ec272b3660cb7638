//! Julian dates and sidereal time

use chrono::{DateTime, Utc};

use super::coords::normalize_degrees;

/// Julian date of the J2000.0 epoch
pub const J2000: f64 = 2_451_545.0;

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// An instant on the UT scale, stored as a Julian date.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct JulianDate(f64);

impl JulianDate {
    pub fn new(jd_ut: f64) -> Self {
        Self(jd_ut)
    }

    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        let seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
        Self(UNIX_EPOCH_JD + seconds / SECONDS_PER_DAY)
    }

    pub fn ut(&self) -> f64 {
        self.0
    }

    /// Terrestrial time Julian date (JDE).
    pub fn tt(&self) -> f64 {
        self.0 + delta_t_seconds(self.decimal_year()) / SECONDS_PER_DAY
    }

    /// Julian centuries of TT since J2000.0
    pub fn centuries_tt(&self) -> f64 {
        (self.tt() - J2000) / DAYS_PER_CENTURY
    }

    pub fn decimal_year(&self) -> f64 {
        2000.0 + (self.0 - J2000) / 365.25
    }
}

impl From<DateTime<Utc>> for JulianDate {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(&dt)
    }
}

/// TT - UT in seconds (Espenak & Meeus polynomials).
pub fn delta_t_seconds(year: f64) -> f64 {
    if (1986.0..2005.0).contains(&year) {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if (2005.0..2050.0).contains(&year) {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t * t
    } else if (2050.0..2150.0).contains(&year) {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - year)
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

/// Greenwich mean sidereal time in degrees (IAU 1982 expression, UT input).
pub fn greenwich_mean_sidereal_time(jd: &JulianDate) -> f64 {
    let d = jd.ut() - J2000;
    let t = d / DAYS_PER_CENTURY;
    let theta = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    normalize_degrees(theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    #[test]
    fn test_julian_date_from_datetime() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_abs_diff_eq!(JulianDate::from_datetime(&dt).ut(), J2000, epsilon = 1e-9);

        // Meeus example 7.a: 1957 October 4.81
        let sputnik = Utc.with_ymd_and_hms(1957, 10, 4, 19, 26, 24).unwrap();
        assert_abs_diff_eq!(JulianDate::from(sputnik).ut(), 2_436_116.31, epsilon = 1e-6);
    }

    #[test]
    fn test_delta_t_modern() {
        let dt = delta_t_seconds(2026.0);
        assert!(dt > 65.0 && dt < 75.0, "unexpected delta T {}", dt);
        assert_abs_diff_eq!(delta_t_seconds(2000.0), 63.86, epsilon = 1e-9);
    }

    #[test]
    fn test_gmst_meeus_example() {
        // Meeus example 12.a: 1987 April 10, 0h UT -> 13h10m46.3668s
        let gmst = greenwich_mean_sidereal_time(&JulianDate::new(2_446_895.5));
        assert_abs_diff_eq!(gmst, 197.693_195, epsilon = 1e-5);
    }
}
