use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use stargaze_common::NightWindow;

use crate::config::MilkyWayConfig;
use crate::error::{Result, StargazeError};
use crate::model::ephemeris::{
    dms_to_degrees, hms_to_degrees, moon, moon_horizontal, star_horizontal, sun_horizontal,
    JulianDate, Observer,
};

/// Sagittarius A*, J2000
const GALACTIC_CENTRE_RA: (f64, f64, f64) = (17.0, 45.0, 40.0);
const GALACTIC_CENTRE_DEC: (f64, f64, f64) = (-29.0, 0.0, 28.0);

const NIGHT_START_HOUR: u32 = 18;
const NIGHT_LENGTH_HOURS: i64 = 12;

/// Everything the visibility rule looks at for one instant
#[derive(Debug, Clone, Copy)]
pub struct SkyConditions {
    pub sun_altitude: f64,
    pub core_altitude: f64,
    pub moon_altitude: f64,
    pub moon_illumination: f64,
}

pub struct MilkyWayScanner<'a> {
    config:    &'a MilkyWayConfig,
    observer:  Observer,
    tz:        Tz,
    core_ra:   f64,
    core_dec:  f64,
}

impl<'a> MilkyWayScanner<'a> {
    pub fn new(config: &'a MilkyWayConfig) -> Result<Self> {
        if config.step_minutes <= 0 {
            return Err(StargazeError::InvalidTime(format!(
                "sampling step must be positive, got {} minutes",
                config.step_minutes
            )));
        }
        let (h, m, s) = GALACTIC_CENTRE_RA;
        let (d, am, asec) = GALACTIC_CENTRE_DEC;
        Ok(Self {
            config,
            observer: config.observer.observer(),
            tz:       config.observer.time_zone()?,
            core_ra:  hms_to_degrees(h, m, s),
            core_dec: dms_to_degrees(d, am, asec),
        })
    }

    pub fn conditions(&self, instant: DateTime<Utc>) -> SkyConditions {
        let jd = JulianDate::from(instant);
        SkyConditions {
            sun_altitude:      sun_horizontal(&self.observer, &jd).altitude,
            core_altitude:     star_horizontal(&self.observer, self.core_ra, self.core_dec, &jd).altitude,
            moon_altitude:     moon_horizontal(&self.observer, &jd).altitude,
            moon_illumination: moon::fraction_illuminated(&jd),
        }
    }

    pub fn is_visible(&self, sky: &SkyConditions) -> bool {
        let dark = sky.sun_altitude < self.config.sun_altitude_limit;
        let core_up = sky.core_altitude > self.config.min_altitude;
        let moon_ok = sky.moon_altitude < 0.0
            || sky.moon_illumination < self.config.moon_illumination_limit;
        dark && core_up && moon_ok
    }

    /// Sample instants from 18:00 local on `evening` up to (not including) 06:00 the next morning.
    pub fn night_samples(&self, evening: NaiveDate) -> Result<Vec<DateTime<Utc>>> {
        let local = evening.and_time(NaiveTime::from_hms_opt(NIGHT_START_HOUR, 0, 0).unwrap_or_default());
        let start = self
            .tz
            .from_local_datetime(&local)
            .earliest()
            .ok_or_else(|| StargazeError::InvalidTime(format!("{} in {}", local, self.tz)))?
            .with_timezone(&Utc);
        let end = start + Duration::hours(NIGHT_LENGTH_HOURS);
        let step = Duration::minutes(self.config.step_minutes);

        let mut samples = Vec::new();
        let mut t = start;
        while t < end {
            samples.push(t);
            t += step;
        }
        Ok(samples)
    }

    /// Shooting window of the night starting on `evening`, if any.
    pub fn scan_night(&self, evening: NaiveDate) -> Result<Option<NightWindow>> {
        let samples: Vec<(DateTime<Tz>, bool)> = self
            .night_samples(evening)?
            .into_iter()
            .map(|t| (t.with_timezone(&self.tz), self.is_visible(&self.conditions(t))))
            .collect();
        Ok(window_from_samples(&samples, self.config.min_window_minutes))
    }

    /// Windows for every evening of the configured year.
    pub fn scan_year(&self) -> Result<Vec<NightWindow>> {
        let year = self.config.year;
        let first = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| StargazeError::InvalidTime(format!("year {}", year)))?;

        tracing::info!(
            "Scanning {} for site {}, {}",
            year,
            self.observer.latitude,
            self.observer.longitude
        );

        let mut windows = Vec::new();
        for evening in first.iter_days().take_while(|d| d.year() == year) {
            if let Some(window) = self.scan_night(evening)? {
                tracing::debug!("{}", window);
                windows.push(window);
            }
        }

        tracing::info!("Found {} nights with a Milky Way window", windows.len());
        Ok(windows)
    }
}

/// Collapse a night of `(local instant, visible)` samples into one window.
///
/// The window runs from the first to the last visible sample, hidden samples
/// in between included, and is dated by the first visible sample. Spans of
/// `min_window_minutes` or less yield `None`.
pub fn window_from_samples(
    samples: &[(DateTime<Tz>, bool)],
    min_window_minutes: i64,
) -> Option<NightWindow> {
    let mut visible = samples.iter().filter(|(_, v)| *v).map(|(t, _)| t);
    let first = visible.next()?;
    let last = visible.last().unwrap_or(first);
    if (*last - *first).num_seconds() <= min_window_minutes * 60 {
        return None;
    }

    Some(NightWindow::new(
        first.format("%Y-%m-%d").to_string(),
        first.format("%H:%M").to_string(),
        last.format("%H:%M").to_string(),
    ))
}

/// Console listing in the `data = [ ... ]` layout.
pub fn format_listing(windows: &[NightWindow]) -> String {
    let mut out = String::from("\ndata = [\n");
    for window in windows {
        out.push_str(&window.to_listing_line());
        out.push('\n');
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(config: &MilkyWayConfig) -> MilkyWayScanner<'_> {
        MilkyWayScanner::new(config).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sky(sun: f64, core: f64, moon_alt: f64, illum: f64) -> SkyConditions {
        SkyConditions {
            sun_altitude:      sun,
            core_altitude:     core,
            moon_altitude:     moon_alt,
            moon_illumination: illum,
        }
    }

    /// Ten-minute samples from 18:00 Bangkok time on `evening`, visible where `flags` is true.
    fn bangkok_night(evening: NaiveDate, flags: &[bool]) -> Vec<(DateTime<Tz>, bool)> {
        let tz = chrono_tz::Asia::Bangkok;
        let start = tz
            .from_local_datetime(&evening.and_hms_opt(18, 0, 0).unwrap())
            .single()
            .unwrap();
        flags
            .iter()
            .enumerate()
            .map(|(i, v)| (start + Duration::minutes(10 * i as i64), *v))
            .collect()
    }

    fn visible_between(from: usize, to: usize) -> Vec<bool> {
        (0..72).map(|i| (from..=to).contains(&i)).collect()
    }

    #[test]
    fn test_window_must_exceed_minimum() {
        let evening = date(2026, 7, 10);
        // 19:00 to 19:20 spans exactly 20 minutes
        let exact = bangkok_night(evening, &visible_between(6, 8));
        assert!(window_from_samples(&exact, 20).is_none());

        let longer = bangkok_night(evening, &visible_between(6, 9));
        let window = window_from_samples(&longer, 20).unwrap();
        assert_eq!(window, NightWindow::new("2026-07-10", "19:00", "19:30"));

        let single = bangkok_night(evening, &visible_between(6, 6));
        assert!(window_from_samples(&single, 0).is_none());
        assert!(window_from_samples(&bangkok_night(evening, &[false; 72]), 20).is_none());
    }

    #[test]
    fn test_gap_does_not_split_window() {
        let mut flags = visible_between(12, 20);
        for flag in &mut flags[30..=40] {
            *flag = true;
        }
        let samples = bangkok_night(date(2026, 5, 20), &flags);
        let window = window_from_samples(&samples, 20).unwrap();
        assert_eq!(window, NightWindow::new("2026-05-20", "20:00", "00:40"));
    }

    #[test]
    fn test_window_dated_by_first_visible_sample() {
        // First visible sample at 01:00 the next morning
        let samples = bangkok_night(date(2026, 12, 31), &visible_between(42, 60));
        let window = window_from_samples(&samples, 20).unwrap();
        assert_eq!(window, NightWindow::new("2027-01-01", "01:00", "04:00"));
    }

    #[test]
    fn test_visibility_rule() {
        let config = MilkyWayConfig::default();
        let s = scanner(&config);
        assert!(s.is_visible(&sky(-25.0, 30.0, 20.0, 0.1)));
        assert!(s.is_visible(&sky(-25.0, 30.0, -5.0, 0.9)));
        assert!(!s.is_visible(&sky(-25.0, 30.0, 5.0, 0.9)));
        assert!(!s.is_visible(&sky(-18.0, 30.0, -5.0, 0.0)));
        assert!(!s.is_visible(&sky(-25.0, 10.0, -5.0, 0.0)));
        assert!(!s.is_visible(&sky(-25.0, 30.0, 5.0, 0.2)));
    }

    #[test]
    fn test_night_samples_cover_twelve_hours() {
        let config = MilkyWayConfig::default();
        let samples = scanner(&config).night_samples(date(2026, 3, 1)).unwrap();
        assert_eq!(samples.len(), 72);
        // 18:00 Bangkok is 11:00 UTC
        assert_eq!(samples[0].to_rfc3339(), "2026-03-01T11:00:00+00:00");
        assert_eq!(samples[71].to_rfc3339(), "2026-03-01T22:50:00+00:00");
    }

    #[test]
    fn test_new_moon_june_night_has_long_window() {
        // New moon 2026-06-15, core culminates near local midnight
        let config = MilkyWayConfig::default();
        let window = scanner(&config).scan_night(date(2026, 6, 15)).unwrap().unwrap();
        assert_eq!(window.date, "2026-06-15");
        assert!(window.start.as_str() >= "19:00" && window.start.as_str() <= "21:00", "{}", window);
        assert!(window.end.as_str() >= "03:00" && window.end.as_str() <= "05:30", "{}", window);
    }

    #[test]
    fn test_full_moon_night_is_washed_out() {
        // Full moon 2026-06-29/30, up from dusk to dawn
        let config = MilkyWayConfig::default();
        assert!(scanner(&config).scan_night(date(2026, 6, 29)).unwrap().is_none());
    }

    #[test]
    fn test_core_below_horizon_in_december() {
        let config = MilkyWayConfig::default();
        assert!(scanner(&config).scan_night(date(2026, 12, 21)).unwrap().is_none());
    }

    #[test]
    fn test_scan_year_is_ordered_and_long_enough() {
        let config = MilkyWayConfig::default();
        let windows = scanner(&config).scan_year().unwrap();
        assert!(!windows.is_empty());
        for pair in windows.windows(2) {
            assert!(pair[0].date <= pair[1].date);
        }
        for w in &windows {
            assert!(w.date.starts_with("2026-") || w.date.starts_with("2027-01-01"));
            assert_ne!(w.start, w.end);
        }
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let config = MilkyWayConfig {
            step_minutes: 0,
            ..MilkyWayConfig::default()
        };
        assert!(MilkyWayScanner::new(&config).is_err());
    }

    #[test]
    fn test_listing_layout() {
        let windows = vec![
            NightWindow::new("2026-10-01", "19:00", "21:10"),
            NightWindow::new("2026-10-02", "19:00", "21:10"),
        ];
        assert_eq!(
            format_listing(&windows),
            "\ndata = [\n    {\"Date\": \"2026-10-01\", \"Start\": \"19:00\", \"End\": \"21:10\"},\n    {\"Date\": \"2026-10-02\", \"Start\": \"19:00\", \"End\": \"21:10\"},\n]"
        );
    }
}
