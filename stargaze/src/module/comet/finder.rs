use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use stargaze_common::{round_to, ClosestApproach, CometReport};

use crate::config::{CheckSlot, CometConfig};
use crate::error::{Result, StargazeError};
use crate::model::catalog::CometElements;
use crate::model::ephemeris::{observe, sun_horizontal, CometOrbit, JulianDate, Observer};

/// Magnitude reported for comets without photometric parameters
pub const UNKNOWN_MAGNITUDE: f64 = 999.0;
const DEFAULT_SLOPE_K: f64 = 10.0;
const KM_PER_AU: f64 = 149_597_870.7;
const SCREENING_DAY: u32 = 15;

/// Total magnitude `g + 5 log10(Δ) + k log10(r)`.
pub fn comet_magnitude(elements: &CometElements, earth_distance: f64, sun_distance: f64) -> f64 {
    let Some(g) = elements.magnitude_g else {
        return UNKNOWN_MAGNITUDE;
    };
    let k = elements.magnitude_k.unwrap_or(DEFAULT_SLOPE_K);
    let magnitude = g + 5.0 * earth_distance.log10() + k * sun_distance.log10();
    if magnitude.is_finite() { magnitude } else { UNKNOWN_MAGNITUDE }
}

/// Sky conditions for one comet at one check slot
#[derive(Debug, Clone)]
pub struct SlotSample {
    pub label: String,
    pub local_time: String,
    pub sun_altitude: f64,
    pub altitude: f64,
    pub azimuth: f64,
}

/// Highest slot that is dark enough and where the comet clears `min_altitude`.
pub fn best_sighting(samples: &[SlotSample], sun_limit: f64, min_altitude: f64) -> Option<&SlotSample> {
    let mut best: Option<&SlotSample> = None;
    for sample in samples {
        if sample.sun_altitude > sun_limit || sample.altitude <= min_altitude {
            continue;
        }
        if best.is_none_or(|b| sample.altitude > b.altitude) {
            best = Some(sample);
        }
    }
    best
}

struct Candidate<'c> {
    elements:  &'c CometElements,
    orbit:     CometOrbit,
    magnitude: f64,
}

pub struct CometFinder<'a> {
    config:   &'a CometConfig,
    observer: Observer,
    tz:       Tz,
}

impl<'a> CometFinder<'a> {
    pub fn new(config: &'a CometConfig) -> Result<Self> {
        Ok(Self {
            config,
            observer: config.observer.observer(),
            tz:       config.observer.time_zone()?,
        })
    }

    /// Screening instant: 00:00 UTC on the 15th.
    pub fn screening_instant(year: i32, month: u32) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(year, month, SCREENING_DAY)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Check slots of `month` resolved to UTC instants.
    pub fn slot_instants(&self, month: u32) -> Result<Vec<(&CheckSlot, DateTime<Utc>)>> {
        let year = self.config.year;
        let base = NaiveDate::from_ymd_opt(year, month, SCREENING_DAY)
            .ok_or_else(|| StargazeError::InvalidTime(format!("{}-{:02}-{}", year, month, SCREENING_DAY)))?;

        self.config
            .check_slots
            .iter()
            .map(|slot| {
                let time = NaiveTime::parse_from_str(&slot.time, "%H:%M")
                    .map_err(|_| StargazeError::InvalidTime(format!("check slot '{}'", slot.time)))?;
                let local = (base + Duration::days(slot.day_offset)).and_time(time);
                let instant = self
                    .tz
                    .from_local_datetime(&local)
                    .earliest()
                    .ok_or_else(|| StargazeError::InvalidTime(format!("{} in {}", local, self.tz)))?;
                Ok((slot, instant.with_timezone(&Utc)))
            })
            .collect()
    }

    /// Comets bright enough on the screening date.
    fn screen<'c>(&self, comets: &'c [CometElements], instant: DateTime<Utc>) -> Vec<Candidate<'c>> {
        let jd = JulianDate::from(instant);
        let mut candidates = Vec::new();

        for elements in comets {
            let result = elements.orbit().and_then(|orbit| {
                let observation = observe(&orbit, &jd)?;
                Ok((orbit, observation))
            });
            let (orbit, observation) = match result {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", elements.name(), e);
                    continue;
                }
            };

            let magnitude = comet_magnitude(elements, observation.earth_distance, observation.sun_distance);
            if magnitude <= self.config.max_magnitude {
                candidates.push(Candidate { elements, orbit, magnitude });
            }
        }
        candidates
    }

    fn sample_slots(&self, orbit: &CometOrbit, slots: &[(&CheckSlot, DateTime<Utc>)]) -> Vec<SlotSample> {
        let mut samples = Vec::new();
        for (slot, instant) in slots {
            let jd = JulianDate::from(*instant);
            let sun = sun_horizontal(&self.observer, &jd);
            let observation = match observe(orbit, &jd) {
                Ok(o) => o,
                Err(e) => {
                    tracing::debug!("Slot {} skipped: {}", slot.label, e);
                    continue;
                }
            };
            let (ra, dec) = observation.ra_dec_of_date();
            let position = self.observer.horizontal_at_distance(
                ra,
                dec,
                observation.earth_distance * KM_PER_AU,
                &jd,
            );
            samples.push(SlotSample {
                label:        slot.label.clone(),
                local_time:   instant.with_timezone(&self.tz).format("%Y-%m-%d %H:%M:%S").to_string(),
                sun_altitude: sun.altitude,
                altitude:     position.altitude,
                azimuth:      position.azimuth,
            });
        }
        samples
    }

    /// Minimum geocentric distance over daily 00:00 UTC samples, day-of-year 1..=366.
    pub fn closest_approach(&self, orbit: &CometOrbit) -> Option<ClosestApproach> {
        let first = NaiveDate::from_ymd_opt(self.config.year, 1, 1)?.and_hms_opt(0, 0, 0)?.and_utc();
        let mut best: Option<(DateTime<Utc>, f64)> = None;

        for day in 0..366 {
            let instant = first + Duration::days(day);
            let Ok(observation) = observe(orbit, &JulianDate::from(instant)) else {
                continue;
            };
            if best.is_none_or(|(_, d)| observation.earth_distance < d) {
                best = Some((instant, observation.earth_distance));
            }
        }

        best.map(|(instant, distance)| ClosestApproach {
            date:        instant.with_timezone(&self.tz).format("%Y-%m-%d").to_string(),
            distance_au: round_to(distance, 4),
        })
    }

    /// Run the search over every configured month.
    pub fn search(&self, comets: &[CometElements]) -> Vec<CometReport> {
        let mut results = Vec::new();

        for month in self.config.start_month..=self.config.end_month {
            tracing::info!("Checking month {}/{}", month, self.config.year);

            let Some(instant) = Self::screening_instant(self.config.year, month) else {
                tracing::warn!("Skipping invalid month {}", month);
                continue;
            };
            let slots = match self.slot_instants(month) {
                Ok(slots) => slots,
                Err(e) => {
                    tracing::warn!("Skipping month {}: {}", month, e);
                    continue;
                }
            };

            let candidates = self.screen(comets, instant);
            if candidates.is_empty() {
                tracing::info!("  no comets brighter than magnitude {} this month", self.config.max_magnitude);
                continue;
            }
            tracing::info!("  {} candidates, checking sky position...", candidates.len());

            let mut found = 0;
            for candidate in &candidates {
                let samples = self.sample_slots(&candidate.orbit, &slots);
                let Some(best) = best_sighting(
                    &samples,
                    self.config.sun_altitude_limit,
                    self.config.min_altitude,
                ) else {
                    continue;
                };

                let Some(closest_approach) = self.closest_approach(&candidate.orbit) else {
                    tracing::warn!("No closest approach for {}", candidate.elements.name());
                    continue;
                };

                results.push(CometReport {
                    month,
                    year: self.config.year,
                    name: candidate.elements.name().to_string(),
                    magnitude: round_to(candidate.magnitude, 2),
                    altitude_max: round_to(best.altitude, 2),
                    azimuth: round_to(best.azimuth, 2),
                    visibility_period: best.label.clone(),
                    check_date_local: best.local_time.clone(),
                    closest_approach,
                });
                found += 1;
            }
            tracing::info!("  confirmed photographable: {}", found);
        }

        results
    }
}
